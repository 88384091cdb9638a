// Transition decision: controller outcome -> OK/KO target, with no-op rules

use super::controller::ControllerRegistry;
use crate::workflows::{StateId, TaskConfig, UNSET_STATE_ID};

/// Outcome of evaluating a task configuration against a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The configured controller name is not registered.
    ControllerNotFound { controller: String },
    /// The target for this outcome is unset.
    TargetUnset { outcome: bool },
    /// The target for this outcome is the current state.
    AlreadyInState { state: StateId, outcome: bool },
    /// Move the resource to `target`.
    Transition { target: StateId, outcome: bool },
}

impl Decision {
    pub fn target(&self) -> Option<StateId> {
        match self {
            Decision::Transition { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Whether the no-op comes from a task that cannot decide at all.
    pub fn is_misconfigured(&self) -> bool {
        matches!(self, Decision::ControllerNotFound { .. })
    }
}

/// Evaluate `config` for a resource sitting in `current_state`.
pub fn evaluate(
    registry: &ControllerRegistry,
    resource_id: i32,
    resource_type: &str,
    config: &TaskConfig,
    current_state: StateId,
) -> Decision {
    let Some(controller) = registry.resolve(&config.controller_name) else {
        return Decision::ControllerNotFound {
            controller: config.controller_name.clone(),
        };
    };

    let outcome = controller.evaluate(resource_id, resource_type);
    // A raw `-1` that slipped in as `Some` is still the unset sentinel
    let candidate = config
        .target_for(outcome)
        .filter(|state| state.0 != UNSET_STATE_ID);
    match candidate {
        None => Decision::TargetUnset { outcome },
        Some(state) if state == current_state => Decision::AlreadyInState { state, outcome },
        Some(target) => Decision::Transition { target, outcome },
    }
}

/// Target state to move to, or `None` when no transition applies.
pub fn decide(
    registry: &ControllerRegistry,
    resource_id: i32,
    resource_type: &str,
    config: &TaskConfig,
    current_state: StateId,
) -> Option<StateId> {
    evaluate(registry, resource_id, resource_type, config, current_state).target()
}
