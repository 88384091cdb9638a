// Store capabilities consumed by the choose-state task
//
// Every trait is object safe so the service can hold `Arc<dyn ...>` handles
// to whatever backend the host engine wires in.

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::StoreError;
use crate::workflows::{
    Action, ActionId, HistoryId, NewResourceHistory, ResourceHistoryRecord, ResourceKey,
    ResourceWorkflowAssignment, StateFilter, StateId, Task, TaskConfig, TaskId, TaskInformation,
    Workflow, WorkflowId, WorkflowState,
};

/// Read access to workflow reference data: workflows, actions, states and tasks.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait WorkflowCatalog: Send + Sync {
    fn find_workflow(&self, id: WorkflowId) -> Result<Option<Workflow>, StoreError>;

    fn find_action(&self, id: ActionId) -> Result<Option<Action>, StoreError>;

    fn find_state(&self, id: StateId) -> Result<Option<WorkflowState>, StoreError>;

    /// States matching `filter`, in catalog order.
    fn list_states(&self, filter: &StateFilter) -> Result<Vec<WorkflowState>, StoreError>;

    fn find_task(&self, id: TaskId) -> Result<Option<Task>, StoreError>;
}

/// Read access to the shared resource history log.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait ResourceHistoryStore: Send + Sync {
    fn find_history(&self, id: HistoryId) -> Result<Option<ResourceHistoryRecord>, StoreError>;
}

/// Read access to resource-to-state assignments.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait ResourceWorkflowStore: Send + Sync {
    fn find_assignment(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<ResourceWorkflowAssignment>, StoreError>;
}

/// Everything one state transition writes.
///
/// Applied in order: history insert, assignment update, task information
/// insert linked to the new history id. The stored assignment must still be
/// in `expected_state` when the write is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionWrite {
    pub history: NewResourceHistory,
    pub expected_state: StateId,
    pub assignment: ResourceWorkflowAssignment,
    pub task_id: TaskId,
    pub new_state_name: String,
}

/// Atomic write side of a transition.
///
/// `commit_transition` must either persist all three records of a
/// [`TransitionWrite`] or none of them. It returns the id assigned to the
/// new history record.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait TransitionStore: Send + Sync {
    fn commit_transition(&self, write: TransitionWrite) -> Result<HistoryId, StoreError>;
}

/// Persistence of per-task settings.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait TaskConfigStore: Send + Sync {
    fn find_config(&self, task_id: TaskId) -> Result<Option<TaskConfig>, StoreError>;

    /// Returns `Err(StoreError::ConfigAlreadyExists)` if the task already has one.
    fn create_config(&self, config: &TaskConfig) -> Result<(), StoreError>;

    /// Returns `Err(StoreError::ConfigNotFound)` if the task has none.
    fn update_config(&self, config: &TaskConfig) -> Result<(), StoreError>;

    /// Returns whether a config was removed.
    fn remove_config(&self, task_id: TaskId) -> Result<bool, StoreError>;
}

/// Access to the audit rows written by choose-state transitions.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait TaskInformationStore: Send + Sync {
    fn find_task_information(
        &self,
        history_id: HistoryId,
        task_id: TaskId,
    ) -> Result<Option<TaskInformation>, StoreError>;

    /// Returns the number of rows removed.
    fn remove_task_information_by_task(&self, task_id: TaskId) -> Result<usize, StoreError>;
}
