// Workflow domain model: states, actions, assignments and history

pub mod types;

pub use types::{
    Action, ActionId, HistoryId, Locale, NewResourceHistory, ResourceHistoryRecord, ResourceKey,
    ResourceWorkflowAssignment, SelectableState, StateFilter, StateId, Task, TaskConfig, TaskId,
    TaskInformation, Workflow, WorkflowId, WorkflowState, AUTOMATIC_ACTOR, UNSET_STATE_ID,
};
