// Store capabilities and the backends shipped with the crate

mod data;
mod error;
mod file;
mod memory;
mod traits;

pub use data::StoreData;
pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use traits::{
    ResourceHistoryStore, ResourceWorkflowStore, TaskConfigStore, TaskInformationStore,
    TransitionStore, TransitionWrite, WorkflowCatalog,
};

#[cfg(any(test, feature = "testing"))]
pub use traits::{
    MockResourceHistoryStore, MockResourceWorkflowStore, MockTaskConfigStore,
    MockTaskInformationStore, MockTransitionStore, MockWorkflowCatalog,
};

use std::sync::Arc;

/// Handles to every store capability the choose-state task consumes.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn WorkflowCatalog>,
    pub history: Arc<dyn ResourceHistoryStore>,
    pub assignments: Arc<dyn ResourceWorkflowStore>,
    pub transitions: Arc<dyn TransitionStore>,
    pub configs: Arc<dyn TaskConfigStore>,
    pub task_information: Arc<dyn TaskInformationStore>,
}

impl Stores {
    /// Use one backend for every capability.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: WorkflowCatalog
            + ResourceHistoryStore
            + ResourceWorkflowStore
            + TransitionStore
            + TaskConfigStore
            + TaskInformationStore
            + 'static,
    {
        Self {
            catalog: backend.clone(),
            history: backend.clone(),
            assignments: backend.clone(),
            transitions: backend.clone(),
            configs: backend.clone(),
            task_information: backend,
        }
    }
}
