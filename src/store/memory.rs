use std::sync::Mutex;

use super::data::{impl_store_traits, StoreData};
use super::StoreError;
use crate::workflows::{
    Action, ResourceHistoryRecord, ResourceWorkflowAssignment, Task, TaskConfig, WorkflowState,
};

/// Store backend holding everything in process memory.
///
/// Each trait call takes the store mutex once, so a `commit_transition` is
/// atomic with respect to every other call on the same store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Mutex<StoreData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoreData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    /// Copy of the current content, for inspection.
    pub fn snapshot(&self) -> Result<StoreData, StoreError> {
        self.read(StoreData::clone)
    }

    pub fn insert_action(&self, action: Action) -> Result<(), StoreError> {
        self.write(|data| {
            data.actions.retain(|a| a.id != action.id);
            data.actions.push(action);
            Ok(())
        })
    }

    pub fn insert_state(&self, state: WorkflowState) -> Result<(), StoreError> {
        self.write(|data| {
            data.states.retain(|s| s.id != state.id);
            data.states.push(state);
            Ok(())
        })
    }

    pub fn insert_task(&self, task: Task) -> Result<(), StoreError> {
        self.write(|data| {
            data.tasks.retain(|t| t.id != task.id);
            data.tasks.push(task);
            Ok(())
        })
    }

    pub fn insert_assignment(
        &self,
        assignment: ResourceWorkflowAssignment,
    ) -> Result<(), StoreError> {
        self.write(|data| {
            data.upsert_assignment(assignment);
            Ok(())
        })
    }

    /// Append a history record written by some other task kind.
    pub fn insert_history(&self, record: ResourceHistoryRecord) -> Result<(), StoreError> {
        self.write(|data| {
            data.history.push(record);
            Ok(())
        })
    }

    pub fn insert_config(&self, config: TaskConfig) -> Result<(), StoreError> {
        self.write(|data| data.insert_task_config(&config))
    }

    fn read<R>(&self, f: impl FnOnce(&StoreData) -> R) -> Result<R, StoreError> {
        let data = self.data.lock().map_err(|_| StoreError::poisoned())?;
        Ok(f(&data))
    }

    fn write<R>(
        &self,
        f: impl FnOnce(&mut StoreData) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut data = self.data.lock().map_err(|_| StoreError::poisoned())?;
        f(&mut data)
    }
}

impl_store_traits!(InMemoryStore);
