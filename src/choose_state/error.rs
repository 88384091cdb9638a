use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by a choose-state task execution.
///
/// Missing configuration or dangling references are not errors; they end
/// the execution without a transition.
#[derive(Debug, Error)]
pub enum ChooseStateError {
    /// A store read or the transition write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The host's reflexive action cascade failed after the transition was
    /// committed.
    #[error("reflexive action cascade failed: {0:#}")]
    Cascade(anyhow::Error),

    /// The per-resource transition lock was poisoned by a panicking holder.
    #[error("transition lock poisoned")]
    LockPoisoned,
}
