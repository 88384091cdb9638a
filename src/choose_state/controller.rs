use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// A named boolean predicate over a resource.
///
/// The outcome picks between the OK and KO target states of a task.
pub trait Controller: Send + Sync {
    /// Stable name tasks reference in their configuration.
    fn name(&self) -> &str;

    fn evaluate(&self, resource_id: i32, resource_type: &str) -> bool;
}

/// Controllers by name. Filled at process start, read by the decision engine.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the controllers shipped with the crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(AlwaysTrue);
        registry.register(AlwaysFalse);
        registry
    }

    /// Register a controller under its name, replacing any previous holder.
    pub fn register<C: Controller + 'static>(&mut self, controller: C) {
        self.register_shared(Arc::new(controller));
    }

    pub fn register_shared(&mut self, controller: Arc<dyn Controller>) {
        let name = controller.name().to_string();
        if self.controllers.insert(name.clone(), controller).is_some() {
            warn!(controller = %name, "controller registered twice, keeping the latest");
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Controller>> {
        self.controllers.get(name).cloned()
    }

    /// Registered names, sorted, for configuration selectors.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.controllers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.names())
            .finish()
    }
}

/// Controller whose outcome is always OK.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysTrue;

impl Controller for AlwaysTrue {
    fn name(&self) -> &str {
        "always-true"
    }

    fn evaluate(&self, _resource_id: i32, _resource_type: &str) -> bool {
        true
    }
}

/// Controller whose outcome is always KO.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFalse;

impl Controller for AlwaysFalse {
    fn name(&self) -> &str {
        "always-false"
    }

    fn evaluate(&self, _resource_id: i32, _resource_type: &str) -> bool {
        false
    }
}

/// Controller backed by a closure, for hosts that register ad-hoc predicates.
pub struct FnController<F> {
    name: String,
    predicate: F,
}

impl<F> FnController<F>
where
    F: Fn(i32, &str) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> Controller for FnController<F>
where
    F: Fn(i32, &str) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, resource_id: i32, resource_type: &str) -> bool {
        (self.predicate)(resource_id, resource_type)
    }
}
