// Choose-state task: pick the OK/KO target of a task by a named controller,
// then move the resource there
//
// Leaves first: controller registry, decision, executor, service.

pub mod cascade;
pub mod controller;
pub mod decision;
pub mod error;
pub mod executor;
pub mod locks;
pub mod service;

pub use cascade::{LoggingReflexiveRunner, ReflexiveActionRunner};
pub use controller::{AlwaysFalse, AlwaysTrue, Controller, ControllerRegistry, FnController};
pub use decision::{decide, evaluate, Decision};
pub use error::ChooseStateError;
pub use executor::{AppliedTransition, TransitionExecutor};
pub use locks::{KeyGuard, KeyLocks};
pub use service::ChooseStateService;

#[cfg(any(test, feature = "testing"))]
pub use cascade::MockReflexiveActionRunner;

/// Task type key hosts register this task under.
pub const TASK_TYPE_KEY: &str = "taskChooseState";
