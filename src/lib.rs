// choose-state library - rule-driven workflow state transitions
// This exposes the core components for testing and integration

pub mod choose_state;
pub mod cli;
pub mod config;
pub mod store;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use choose_state::{
    AppliedTransition, ChooseStateError, ChooseStateService, Controller, ControllerRegistry,
    Decision, FnController, LoggingReflexiveRunner, ReflexiveActionRunner, TASK_TYPE_KEY,
};
pub use self::config::{config, init_config, ChooseStateConfig};
pub use store::{InMemoryStore, JsonFileStore, StoreData, StoreError, Stores};
pub use telemetry::{create_transition_span, generate_correlation_id, init_telemetry};
pub use workflows::{
    ActionId, HistoryId, Locale, ResourceKey, StateId, TaskConfig, TaskId, WorkflowId,
};
