// Shared fixtures for the choose-state integration tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use choose_state::choose_state::{
    ChooseStateService, ControllerRegistry, LoggingReflexiveRunner, ReflexiveActionRunner,
    TASK_TYPE_KEY,
};
use choose_state::store::{InMemoryStore, StoreData, Stores};
use choose_state::workflows::{
    Action, ActionId, HistoryId, ResourceHistoryRecord, ResourceKey, ResourceWorkflowAssignment,
    StateId, Task, TaskConfig, TaskId, Workflow, WorkflowId, WorkflowState,
};
use std::sync::Arc;

pub const WORKFLOW: WorkflowId = WorkflowId(1);
pub const OTHER_WORKFLOW: WorkflowId = WorkflowId(2);
pub const PENDING: StateId = StateId(3);
pub const ACCEPTED: StateId = StateId(5);
pub const REJECTED: StateId = StateId(7);
pub const ELSEWHERE: StateId = StateId(8);
pub const REVIEW_ACTION: ActionId = ActionId(9);
pub const ARCHIVE_ACTION: ActionId = ActionId(10);
pub const REVIEW_TASK: TaskId = TaskId(3);
pub const ARCHIVE_TASK: TaskId = TaskId(4);
pub const TICKET_ID: i32 = 42;
pub const TICKET: &str = "ticket";
pub const TICKET_HISTORY: HistoryId = HistoryId(1);

fn state(id: StateId, name: &str, workflow_id: WorkflowId) -> WorkflowState {
    WorkflowState {
        id,
        name: name.to_string(),
        workflow_id,
    }
}

pub fn pending() -> WorkflowState {
    state(PENDING, "Pending", WORKFLOW)
}

pub fn review_task() -> Task {
    Task {
        id: REVIEW_TASK,
        action_id: REVIEW_ACTION,
        task_type: TASK_TYPE_KEY.to_string(),
    }
}

pub fn archive_task() -> Task {
    Task {
        id: ARCHIVE_TASK,
        action_id: ARCHIVE_ACTION,
        task_type: TASK_TYPE_KEY.to_string(),
    }
}

pub fn ticket_key() -> ResourceKey {
    ResourceKey::new(TICKET_ID, TICKET, WORKFLOW)
}

pub fn task_config(
    task_id: TaskId,
    controller: &str,
    ok: Option<StateId>,
    ko: Option<StateId>,
) -> TaskConfig {
    TaskConfig {
        task_id,
        controller_name: controller.to_string(),
        id_state_ok: ok,
        id_state_ko: ko,
    }
}

/// Review workflow: ticket#42 pending, reached by history 1, two tasks and
/// no task configuration yet.
pub fn review_workflow() -> StoreData {
    StoreData {
        workflows: vec![
            Workflow {
                id: WORKFLOW,
                name: "Ticket review".to_string(),
            },
            Workflow {
                id: OTHER_WORKFLOW,
                name: "Other".to_string(),
            },
        ],
        actions: vec![
            Action {
                state_before: Some(PENDING),
                ..Action::new(REVIEW_ACTION, "Review", WORKFLOW).with_tasks([REVIEW_TASK])
            },
            Action {
                automatic: true,
                reflexive: true,
                ..Action::new(ARCHIVE_ACTION, "Archive", WORKFLOW).with_tasks([ARCHIVE_TASK])
            },
        ],
        states: vec![
            pending(),
            state(ACCEPTED, "Accepted", WORKFLOW),
            state(REJECTED, "Rejected", WORKFLOW),
            state(ELSEWHERE, "Elsewhere", OTHER_WORKFLOW),
        ],
        tasks: vec![review_task(), archive_task()],
        assignments: vec![ResourceWorkflowAssignment {
            resource_id: TICKET_ID,
            resource_type: TICKET.to_string(),
            workflow_id: WORKFLOW,
            state: pending(),
            external_parent_id: Some(77),
        }],
        history: vec![ResourceHistoryRecord {
            id: TICKET_HISTORY,
            resource_id: TICKET_ID,
            resource_type: TICKET.to_string(),
            action_id: REVIEW_ACTION,
            workflow_id: WORKFLOW,
            created_at: Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap(),
            user_access_code: "alice".to_string(),
        }],
        task_configs: Vec::new(),
        task_information: Vec::new(),
    }
}

pub fn review_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_data(review_workflow()))
}

pub fn service_with(
    store: Arc<InMemoryStore>,
    cascade: Arc<dyn ReflexiveActionRunner>,
) -> ChooseStateService {
    ChooseStateService::new(
        Stores::from_backend(store),
        ControllerRegistry::with_builtins(),
        cascade,
    )
}

pub fn service(store: Arc<InMemoryStore>) -> ChooseStateService {
    service_with(store, Arc::new(LoggingReflexiveRunner))
}
