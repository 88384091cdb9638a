// Seam to the host engine's automatic reflexive action cascade

#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use tracing::info;

use crate::workflows::{Locale, StateId};

/// Runs the automatic reflexive actions bound to a state a resource just
/// entered.
///
/// Reflexive actions act in place: they may run further tasks (including
/// other choose-state tasks) but never go through the state-changing action
/// pipeline themselves.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait ReflexiveActionRunner: Send + Sync {
    fn run_automatic_reflexive_actions(
        &self,
        resource_id: i32,
        resource_type: &str,
        state_id: StateId,
        locale: &Locale,
    ) -> anyhow::Result<()>;
}

/// Runner for hosts without reflexive actions: records the request in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReflexiveRunner;

impl ReflexiveActionRunner for LoggingReflexiveRunner {
    fn run_automatic_reflexive_actions(
        &self,
        resource_id: i32,
        resource_type: &str,
        state_id: StateId,
        locale: &Locale,
    ) -> anyhow::Result<()> {
        info!(
            resource.id = resource_id,
            resource.kind = resource_type,
            state.id = %state_id,
            locale = %locale,
            "no reflexive action engine wired, cascade skipped"
        );
        Ok(())
    }
}
