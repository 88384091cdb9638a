use thiserror::Error;

use crate::workflows::{ResourceKey, StateId, TaskId};

/// All errors that can be returned by a workflow store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No assignment exists for the resource the transition targets.
    #[error("no workflow assignment for resource {0}")]
    AssignmentNotFound(ResourceKey),

    /// The assignment moved since the transition was decided.
    #[error("assignment of {key} is in state {actual}, expected {expected}")]
    StaleAssignment {
        key: ResourceKey,
        expected: StateId,
        actual: StateId,
    },

    /// Every history id up to `i32::MAX` is taken.
    #[error("history ids exhausted")]
    HistoryIdsExhausted,

    /// A config already exists for this task; configs are created once.
    #[error("task config already exists for task {task_id}")]
    ConfigAlreadyExists { task_id: TaskId },

    /// Update of a config that was never created.
    #[error("task config not found for task {task_id}")]
    ConfigNotFound { task_id: TaskId },

    /// Store file could not be read or written.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file content is not valid store data.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock guarding store data was poisoned or could not be taken.
    #[error("store lock failed: {reason}")]
    Lock { reason: String },
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        StoreError::Lock {
            reason: "store mutex poisoned by a panicking writer".to_string(),
        }
    }
}
