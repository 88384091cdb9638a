use serde::{Deserialize, Serialize};

use super::{StoreError, TransitionWrite};
use crate::workflows::{
    Action, ActionId, HistoryId, ResourceHistoryRecord, ResourceKey, ResourceWorkflowAssignment,
    StateFilter, StateId, Task, TaskConfig, TaskId, TaskInformation, Workflow, WorkflowId,
    WorkflowState,
};

/// Complete content of a store, shared by the in-memory and file backends.
///
/// Collections keep insertion order; the catalog order of `states` is the
/// order selectors present them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub workflows: Vec<Workflow>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub states: Vec<WorkflowState>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub assignments: Vec<ResourceWorkflowAssignment>,
    #[serde(default)]
    pub history: Vec<ResourceHistoryRecord>,
    #[serde(default)]
    pub task_configs: Vec<TaskConfig>,
    #[serde(default)]
    pub task_information: Vec<TaskInformation>,
}

impl StoreData {
    // ── Catalog ──────────────────────────────────────────────────────────────

    pub fn workflow(&self, id: WorkflowId) -> Option<Workflow> {
        self.workflows.iter().find(|w| w.id == id).cloned()
    }

    pub fn action(&self, id: ActionId) -> Option<Action> {
        self.actions.iter().find(|a| a.id == id).cloned()
    }

    pub fn state(&self, id: StateId) -> Option<WorkflowState> {
        self.states.iter().find(|s| s.id == id).cloned()
    }

    pub fn states_matching(&self, filter: &StateFilter) -> Vec<WorkflowState> {
        self.states
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.tasks.iter().find(|t| t.id == id).cloned()
    }

    // ── Resources ────────────────────────────────────────────────────────────

    pub fn history_record(&self, id: HistoryId) -> Option<ResourceHistoryRecord> {
        self.history.iter().find(|h| h.id == id).cloned()
    }

    pub fn assignment(&self, key: &ResourceKey) -> Option<ResourceWorkflowAssignment> {
        self.assignments.iter().find(|a| a.key() == *key).cloned()
    }

    /// Insert or replace the assignment for its key.
    pub fn upsert_assignment(&mut self, assignment: ResourceWorkflowAssignment) {
        let key = assignment.key();
        match self.assignments.iter_mut().find(|a| a.key() == key) {
            Some(existing) => *existing = assignment,
            None => self.assignments.push(assignment),
        }
    }

    /// Next free history id; ids start at 1 and are never reused.
    pub fn next_history_id(&self) -> Result<HistoryId, StoreError> {
        let last = self.history.iter().map(|h| h.id.0).max().unwrap_or(0);
        last.checked_add(1)
            .map(HistoryId)
            .ok_or(StoreError::HistoryIdsExhausted)
    }

    /// Apply a transition write. All checks run before the first mutation,
    /// so an `Err` leaves the data untouched.
    pub fn apply_transition(&mut self, write: TransitionWrite) -> Result<HistoryId, StoreError> {
        let key = write.assignment.key();
        let slot = self
            .assignments
            .iter()
            .position(|a| a.key() == key)
            .ok_or_else(|| StoreError::AssignmentNotFound(key.clone()))?;
        let actual = self.assignments[slot].state.id;
        if actual != write.expected_state {
            return Err(StoreError::StaleAssignment {
                key,
                expected: write.expected_state,
                actual,
            });
        }

        let history_id = self.next_history_id()?;
        self.history.push(write.history.with_id(history_id));
        self.assignments[slot] = write.assignment;
        self.task_information.push(TaskInformation {
            history_id,
            task_id: write.task_id,
            new_state: write.new_state_name,
        });

        Ok(history_id)
    }

    // ── Task configs ─────────────────────────────────────────────────────────

    pub fn task_config(&self, task_id: TaskId) -> Option<TaskConfig> {
        self.task_configs.iter().find(|c| c.task_id == task_id).cloned()
    }

    pub fn insert_task_config(&mut self, config: &TaskConfig) -> Result<(), StoreError> {
        if self.task_configs.iter().any(|c| c.task_id == config.task_id) {
            return Err(StoreError::ConfigAlreadyExists {
                task_id: config.task_id,
            });
        }
        self.task_configs.push(config.clone());
        Ok(())
    }

    pub fn replace_task_config(&mut self, config: &TaskConfig) -> Result<(), StoreError> {
        let existing = self
            .task_configs
            .iter_mut()
            .find(|c| c.task_id == config.task_id)
            .ok_or(StoreError::ConfigNotFound {
                task_id: config.task_id,
            })?;
        *existing = config.clone();
        Ok(())
    }

    pub fn delete_task_config(&mut self, task_id: TaskId) -> bool {
        let before = self.task_configs.len();
        self.task_configs.retain(|c| c.task_id != task_id);
        self.task_configs.len() != before
    }

    // ── Task information ─────────────────────────────────────────────────────

    pub fn task_information_for(
        &self,
        history_id: HistoryId,
        task_id: TaskId,
    ) -> Option<TaskInformation> {
        self.task_information
            .iter()
            .find(|i| i.history_id == history_id && i.task_id == task_id)
            .cloned()
    }

    pub fn delete_task_information(&mut self, task_id: TaskId) -> usize {
        let before = self.task_information.len();
        self.task_information.retain(|i| i.task_id != task_id);
        before - self.task_information.len()
    }
}

/// Implements every store trait for a backend exposing
/// `read(|&StoreData| ..)` and `write(|&mut StoreData| ..)`.
macro_rules! impl_store_traits {
    ($backend:ty) => {
        impl $crate::store::WorkflowCatalog for $backend {
            fn find_workflow(
                &self,
                id: $crate::workflows::WorkflowId,
            ) -> Result<Option<$crate::workflows::Workflow>, $crate::store::StoreError> {
                self.read(|data| data.workflow(id))
            }

            fn find_action(
                &self,
                id: $crate::workflows::ActionId,
            ) -> Result<Option<$crate::workflows::Action>, $crate::store::StoreError> {
                self.read(|data| data.action(id))
            }

            fn find_state(
                &self,
                id: $crate::workflows::StateId,
            ) -> Result<Option<$crate::workflows::WorkflowState>, $crate::store::StoreError> {
                self.read(|data| data.state(id))
            }

            fn list_states(
                &self,
                filter: &$crate::workflows::StateFilter,
            ) -> Result<Vec<$crate::workflows::WorkflowState>, $crate::store::StoreError> {
                self.read(|data| data.states_matching(filter))
            }

            fn find_task(
                &self,
                id: $crate::workflows::TaskId,
            ) -> Result<Option<$crate::workflows::Task>, $crate::store::StoreError> {
                self.read(|data| data.task(id))
            }
        }

        impl $crate::store::ResourceHistoryStore for $backend {
            fn find_history(
                &self,
                id: $crate::workflows::HistoryId,
            ) -> Result<Option<$crate::workflows::ResourceHistoryRecord>, $crate::store::StoreError>
            {
                self.read(|data| data.history_record(id))
            }
        }

        impl $crate::store::ResourceWorkflowStore for $backend {
            fn find_assignment(
                &self,
                key: &$crate::workflows::ResourceKey,
            ) -> Result<
                Option<$crate::workflows::ResourceWorkflowAssignment>,
                $crate::store::StoreError,
            > {
                self.read(|data| data.assignment(key))
            }
        }

        impl $crate::store::TransitionStore for $backend {
            fn commit_transition(
                &self,
                write: $crate::store::TransitionWrite,
            ) -> Result<$crate::workflows::HistoryId, $crate::store::StoreError> {
                self.write(|data| data.apply_transition(write))
            }
        }

        impl $crate::store::TaskConfigStore for $backend {
            fn find_config(
                &self,
                task_id: $crate::workflows::TaskId,
            ) -> Result<Option<$crate::workflows::TaskConfig>, $crate::store::StoreError> {
                self.read(|data| data.task_config(task_id))
            }

            fn create_config(
                &self,
                config: &$crate::workflows::TaskConfig,
            ) -> Result<(), $crate::store::StoreError> {
                self.write(|data| data.insert_task_config(config))
            }

            fn update_config(
                &self,
                config: &$crate::workflows::TaskConfig,
            ) -> Result<(), $crate::store::StoreError> {
                self.write(|data| data.replace_task_config(config))
            }

            fn remove_config(
                &self,
                task_id: $crate::workflows::TaskId,
            ) -> Result<bool, $crate::store::StoreError> {
                self.write(|data| Ok(data.delete_task_config(task_id)))
            }
        }

        impl $crate::store::TaskInformationStore for $backend {
            fn find_task_information(
                &self,
                history_id: $crate::workflows::HistoryId,
                task_id: $crate::workflows::TaskId,
            ) -> Result<Option<$crate::workflows::TaskInformation>, $crate::store::StoreError> {
                self.read(|data| data.task_information_for(history_id, task_id))
            }

            fn remove_task_information_by_task(
                &self,
                task_id: $crate::workflows::TaskId,
            ) -> Result<usize, $crate::store::StoreError> {
                self.write(|data| Ok(data.delete_task_information(task_id)))
            }
        }
    };
}

pub(crate) use impl_store_traits;
