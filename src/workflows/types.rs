// Workflow domain types shared by the stores and the choose-state task

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw id persisted for "no transition for this outcome".
pub const UNSET_STATE_ID: i32 = -1;

/// Access code recorded on history entries nobody initiated by hand.
pub const AUTOMATIC_ACTOR: &str = "auto";

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identity of a workflow state, unique within its workflow
    StateId
);
id_type!(
    /// Identity of a workflow
    WorkflowId
);
id_type!(
    /// Identity of a workflow action
    ActionId
);
id_type!(
    /// Identity of a task instance bound to an action
    TaskId
);
id_type!(
    /// Identity of a resource history record
    HistoryId
);

impl StateId {
    /// Interpret a raw persisted id, mapping the `-1` sentinel to `None`.
    pub fn from_raw(raw: i32) -> Option<Self> {
        (raw != UNSET_STATE_ID).then_some(Self(raw))
    }
}

/// A named node of a workflow. Reference data owned by the state catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: StateId,
    pub name: String,
    pub workflow_id: WorkflowId,
}

/// A workflow: the graph of states and actions a resource moves through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
}

/// A workflow edge/operation that runs bound tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub name: String,
    pub workflow_id: WorkflowId,
    /// State the action starts from, `None` for any state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_before: Option<StateId>,
    /// State the action leads to, `None` when it leaves the state alone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_after: Option<StateId>,
    /// Run by the engine without a human actor
    #[serde(default)]
    pub automatic: bool,
    /// Runs in place when its state is entered
    #[serde(default)]
    pub reflexive: bool,
    /// Tasks bound to the action, in execution order
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
}

impl Action {
    /// Plain manual action with no state constraints and no bound tasks.
    pub fn new(id: ActionId, name: impl Into<String>, workflow_id: WorkflowId) -> Self {
        Self {
            id,
            name: name.into(),
            workflow_id,
            state_before: None,
            state_after: None,
            automatic: false,
            reflexive: false,
            task_ids: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, task_ids: impl IntoIterator<Item = TaskId>) -> Self {
        self.task_ids = task_ids.into_iter().collect();
        self
    }

    /// Whether `task_id` is listed among the bound tasks. An action that
    /// lists none accepts any task whose `action_id` points at it.
    pub fn binds(&self, task_id: TaskId) -> bool {
        self.task_ids.is_empty() || self.task_ids.contains(&task_id)
    }
}

/// A configurable unit of behavior attached to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub action_id: ActionId,
    /// Task type key, e.g. `"taskChooseState"`
    pub task_type: String,
}

/// Filter for listing states from the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateFilter {
    pub workflow_id: Option<WorkflowId>,
}

impl StateFilter {
    pub fn for_workflow(workflow_id: WorkflowId) -> Self {
        Self {
            workflow_id: Some(workflow_id),
        }
    }

    pub fn matches(&self, state: &WorkflowState) -> bool {
        self.workflow_id
            .map_or(true, |workflow_id| state.workflow_id == workflow_id)
    }
}

/// The serialization unit of transitions: one resource inside one workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub resource_id: i32,
    pub resource_type: String,
    pub workflow_id: WorkflowId,
}

impl ResourceKey {
    pub fn new(
        resource_id: i32,
        resource_type: impl Into<String>,
        workflow_id: WorkflowId,
    ) -> Self {
        Self {
            resource_id,
            resource_type: resource_type.into(),
            workflow_id,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}@workflow:{}",
            self.resource_type, self.resource_id, self.workflow_id
        )
    }
}

/// Binding of a resource to its current state inside one workflow.
///
/// At most one assignment exists per [`ResourceKey`], and `state` always
/// belongs to `workflow_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceWorkflowAssignment {
    pub resource_id: i32,
    pub resource_type: String,
    pub workflow_id: WorkflowId,
    pub state: WorkflowState,
    /// External parent id, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_parent_id: Option<i32>,
}

impl ResourceWorkflowAssignment {
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_id, self.resource_type.clone(), self.workflow_id)
    }
}

/// History entry before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResourceHistory {
    pub resource_id: i32,
    pub resource_type: String,
    pub action_id: ActionId,
    pub workflow_id: WorkflowId,
    pub created_at: DateTime<Utc>,
    pub user_access_code: String,
}

impl NewResourceHistory {
    /// History entry for an action run without a human actor.
    pub fn automatic(key: &ResourceKey, action: &Action, created_at: DateTime<Utc>) -> Self {
        Self {
            resource_id: key.resource_id,
            resource_type: key.resource_type.clone(),
            action_id: action.id,
            workflow_id: action.workflow_id,
            created_at,
            user_access_code: AUTOMATIC_ACTOR.to_string(),
        }
    }

    pub fn with_id(self, id: HistoryId) -> ResourceHistoryRecord {
        ResourceHistoryRecord {
            id,
            resource_id: self.resource_id,
            resource_type: self.resource_type,
            action_id: self.action_id,
            workflow_id: self.workflow_id,
            created_at: self.created_at,
            user_access_code: self.user_access_code,
        }
    }
}

/// Immutable, append-only log entry of one workflow event for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHistoryRecord {
    pub id: HistoryId,
    pub resource_id: i32,
    pub resource_type: String,
    pub action_id: ActionId,
    pub workflow_id: WorkflowId,
    pub created_at: DateTime<Utc>,
    pub user_access_code: String,
}

impl ResourceHistoryRecord {
    pub fn is_automatic(&self) -> bool {
        self.user_access_code == AUTOMATIC_ACTOR
    }
}

/// Audit row linking a history entry to the task that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInformation {
    pub history_id: HistoryId,
    pub task_id: TaskId,
    /// Display name of the state reached
    pub new_state: String,
}

/// Per-task settings of the choose-state task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub task_id: TaskId,
    #[serde(default)]
    pub controller_name: String,
    #[serde(default, with = "unset_state")]
    pub id_state_ok: Option<StateId>,
    #[serde(default, with = "unset_state")]
    pub id_state_ko: Option<StateId>,
}

impl TaskConfig {
    /// Configuration of a task nobody has configured yet: no controller, no targets.
    pub fn unconfigured(task_id: TaskId) -> Self {
        Self {
            task_id,
            controller_name: String::new(),
            id_state_ok: None,
            id_state_ko: None,
        }
    }

    /// Target state for a controller outcome.
    pub fn target_for(&self, outcome: bool) -> Option<StateId> {
        if outcome {
            self.id_state_ok
        } else {
            self.id_state_ko
        }
    }
}

/// Persists `Option<StateId>` as the raw id, `-1` when unset.
mod unset_state {
    use super::{StateId, UNSET_STATE_ID};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<StateId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(value.map_or(UNSET_STATE_ID, |id| id.0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<StateId>, D::Error> {
        Ok(StateId::from_raw(i32::deserialize(deserializer)?))
    }
}

/// One entry of a state selector. `id == None` is the unset entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableState {
    pub id: Option<StateId>,
    pub label: String,
}

impl SelectableState {
    pub fn unset() -> Self {
        Self {
            id: None,
            label: String::new(),
        }
    }

    /// Raw selector key, `-1` for the unset entry
    pub fn raw_id(&self) -> i32 {
        self.id.map_or(UNSET_STATE_ID, |id| id.0)
    }
}

impl From<&WorkflowState> for SelectableState {
    fn from(state: &WorkflowState) -> Self {
        Self {
            id: Some(state.id),
            label: state.name.clone(),
        }
    }
}

/// Locale used for user-facing text produced during a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_targets_persist_as_minus_one() {
        let config = TaskConfig {
            task_id: TaskId(7),
            controller_name: "always-true".to_string(),
            id_state_ok: Some(StateId(5)),
            id_state_ko: None,
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["id_state_ok"], 5);
        assert_eq!(json["id_state_ko"], -1);

        let back: TaskConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_config_fields_default_to_unconfigured() {
        let config: TaskConfig = serde_json::from_str(r#"{"task_id": 3}"#).unwrap();
        assert_eq!(config, TaskConfig::unconfigured(TaskId(3)));
    }

    #[test]
    fn test_target_for_outcome() {
        let config = TaskConfig {
            task_id: TaskId(1),
            controller_name: String::new(),
            id_state_ok: Some(StateId(5)),
            id_state_ko: Some(StateId(3)),
        };
        assert_eq!(config.target_for(true), Some(StateId(5)));
        assert_eq!(config.target_for(false), Some(StateId(3)));
    }

    #[test]
    fn test_state_filter_matches_workflow() {
        let state = WorkflowState {
            id: StateId(1),
            name: "Open".to_string(),
            workflow_id: WorkflowId(2),
        };
        assert!(StateFilter::default().matches(&state));
        assert!(StateFilter::for_workflow(WorkflowId(2)).matches(&state));
        assert!(!StateFilter::for_workflow(WorkflowId(3)).matches(&state));
    }

    #[test]
    fn test_action_without_task_list_binds_any_task() {
        let open = Action::new(ActionId(9), "Check", WorkflowId(1));
        let listed = open.clone().with_tasks([TaskId(3), TaskId(4)]);

        assert!(open.binds(TaskId(12)));
        assert!(listed.binds(TaskId(4)));
        assert!(!listed.binds(TaskId(12)));
    }

    #[test]
    fn test_action_defaults_apply_to_minimal_json() {
        let action: Action =
            serde_json::from_str(r#"{"id":9,"name":"Check","workflow_id":1}"#).unwrap();
        assert_eq!(action, Action::new(ActionId(9), "Check", WorkflowId(1)));
    }

    #[test]
    fn test_automatic_history_uses_action_workflow() {
        let key = ResourceKey::new(42, "ticket", WorkflowId(1));
        let action = Action::new(ActionId(9), "Check", WorkflowId(1));
        let record =
            NewResourceHistory::automatic(&key, &action, Utc::now()).with_id(HistoryId(11));
        assert!(record.is_automatic());
        assert_eq!(record.action_id, ActionId(9));
        assert_eq!(record.workflow_id, WorkflowId(1));
        assert_eq!(record.resource_type, "ticket");
    }
}
