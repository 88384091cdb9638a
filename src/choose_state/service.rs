use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cascade::ReflexiveActionRunner;
use super::controller::ControllerRegistry;
use super::decision::{self, Decision};
use super::executor::{AppliedTransition, TransitionExecutor};
use super::locks::KeyLocks;
use super::ChooseStateError;
use crate::store::{StoreError, Stores};
use crate::telemetry::{create_transition_span, generate_correlation_id};
use crate::workflows::{
    ActionId, HistoryId, Locale, ResourceKey, ResourceWorkflowAssignment, SelectableState,
    StateFilter, StateId, Task, TaskConfig, TaskId, TaskInformation, WorkflowId,
};

/// Host-facing entry points of the choose-state task.
///
/// Transitions on one `(resource, type, workflow)` key are serialized: the
/// decision and the transition write run under a per-key lock, which is
/// released before the reflexive action cascade so the cascade may run
/// this task again on the same resource.
pub struct ChooseStateService {
    stores: Stores,
    registry: ControllerRegistry,
    executor: TransitionExecutor,
    locks: KeyLocks,
}

impl ChooseStateService {
    pub fn new(
        stores: Stores,
        registry: ControllerRegistry,
        cascade: Arc<dyn ReflexiveActionRunner>,
    ) -> Self {
        let executor = TransitionExecutor::new(
            stores.catalog.clone(),
            stores.assignments.clone(),
            stores.transitions.clone(),
            cascade,
        );
        Self {
            stores,
            registry,
            executor,
            locks: KeyLocks::new(),
        }
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// Controller names a task configuration can pick from.
    pub fn controller_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Selector entries for the OK/KO targets of a task bound to `action_id`:
    /// the unset entry, then every state of the action's workflow.
    ///
    /// Unknown action: empty list.
    pub fn list_selectable_states(
        &self,
        action_id: ActionId,
    ) -> Result<Vec<SelectableState>, ChooseStateError> {
        let Some(action) = self.stores.catalog.find_action(action_id)? else {
            return Ok(Vec::new());
        };
        let states = self
            .stores
            .catalog
            .list_states(&StateFilter::for_workflow(action.workflow_id))?;

        let mut selectable = Vec::with_capacity(states.len() + 1);
        selectable.push(SelectableState::unset());
        selectable.extend(states.iter().map(SelectableState::from));
        Ok(selectable)
    }

    /// Load the task's config, creating and persisting the unconfigured
    /// default on first access.
    pub fn load_or_init_config(&self, task_id: TaskId) -> Result<TaskConfig, ChooseStateError> {
        if let Some(config) = self.stores.configs.find_config(task_id)? {
            return Ok(config);
        }

        let config = TaskConfig::unconfigured(task_id);
        match self.stores.configs.create_config(&config) {
            Ok(()) => {
                info!(task.id = %task_id, "created default choose-state config");
                Ok(config)
            }
            // Created by a concurrent caller between our read and write.
            Err(StoreError::ConfigAlreadyExists { .. }) => self
                .stores
                .configs
                .find_config(task_id)?
                .ok_or(ChooseStateError::Store(StoreError::ConfigNotFound { task_id })),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the settings form of a task.
    pub fn save_config(&self, config: &TaskConfig) -> Result<(), ChooseStateError> {
        if self.stores.configs.find_config(config.task_id)?.is_some() {
            self.stores.configs.update_config(config)?;
        } else {
            self.stores.configs.create_config(config)?;
        }
        if !config.controller_name.is_empty()
            && self.registry.resolve(&config.controller_name).is_none()
        {
            warn!(
                task.id = %config.task_id,
                controller = %config.controller_name,
                "saved config names an unregistered controller"
            );
        }
        Ok(())
    }

    /// Drop a deleted task's config and audit rows.
    pub fn remove_task(&self, task_id: TaskId) -> Result<(), ChooseStateError> {
        let removed_rows = self
            .stores
            .task_information
            .remove_task_information_by_task(task_id)?;
        let removed_config = self.stores.configs.remove_config(task_id)?;
        debug!(task.id = %task_id, removed_config, removed_rows, "choose-state task removed");
        Ok(())
    }

    /// Evaluate without side effects beyond logging.
    pub fn decide(
        &self,
        resource_id: i32,
        resource_type: &str,
        config: &TaskConfig,
        current_state: StateId,
    ) -> Decision {
        let decision =
            decision::evaluate(&self.registry, resource_id, resource_type, config, current_state);
        match &decision {
            Decision::ControllerNotFound { controller } => warn!(
                task.id = %config.task_id,
                controller = %controller,
                "no controller registered under this name, task is misconfigured"
            ),
            Decision::TargetUnset { outcome } => debug!(
                task.id = %config.task_id,
                outcome,
                "no target state configured for this outcome"
            ),
            Decision::AlreadyInState { state, outcome } => debug!(
                task.id = %config.task_id,
                state.id = %state,
                outcome,
                "resource already in target state"
            ),
            Decision::Transition { target, outcome } => debug!(
                task.id = %config.task_id,
                target = %target,
                outcome,
                "transition decided"
            ),
        }
        decision
    }

    /// Decide and, when a target results, transition the resource and run
    /// the cascade of the new state.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate_and_transition(
        &self,
        resource_id: i32,
        resource_type: &str,
        task: &Task,
        config: &TaskConfig,
        workflow_id: WorkflowId,
        current_state: StateId,
        locale: &Locale,
    ) -> Result<Option<AppliedTransition>, ChooseStateError> {
        let key = ResourceKey::new(resource_id, resource_type, workflow_id);
        let span = create_transition_span(
            "evaluate_and_transition",
            task.id,
            &key,
            &generate_correlation_id(),
        );
        let _entered = span.enter();

        let applied = {
            let _guard = self.locks.acquire(&key)?;
            let Some(target) = self
                .decide(resource_id, resource_type, config, current_state)
                .target()
            else {
                return Ok(None);
            };
            self.executor.commit(task, &key, target)?
        };

        if let Some(applied) = &applied {
            self.executor.cascade(applied, locale)?;
        }
        Ok(applied)
    }

    /// Assignment of the resource a history record is about, in `workflow_id`.
    pub fn lookup_assignment_for_history(
        &self,
        history_id: HistoryId,
        workflow_id: WorkflowId,
    ) -> Result<Option<ResourceWorkflowAssignment>, ChooseStateError> {
        let Some(history) = self.stores.history.find_history(history_id)? else {
            return Ok(None);
        };
        let key = ResourceKey::new(history.resource_id, history.resource_type, workflow_id);
        Ok(self.stores.assignments.find_assignment(&key)?)
    }

    /// Audit row a choose-state transition left on a history record.
    pub fn task_information(
        &self,
        history_id: HistoryId,
        task_id: TaskId,
    ) -> Result<Option<TaskInformation>, ChooseStateError> {
        Ok(self
            .stores
            .task_information
            .find_task_information(history_id, task_id)?)
    }

    /// Run the task for the resource of `history_id`, the way the host calls
    /// it when the task's action executes.
    pub fn process_task(
        &self,
        history_id: HistoryId,
        task_id: TaskId,
        locale: &Locale,
    ) -> Result<Option<AppliedTransition>, ChooseStateError> {
        let Some(task) = self.stores.catalog.find_task(task_id)? else {
            warn!(task.id = %task_id, "task not found, nothing to process");
            return Ok(None);
        };
        let Some(action) = self.stores.catalog.find_action(task.action_id)? else {
            warn!(
                task.id = %task_id,
                action.id = %task.action_id,
                "task action not found, nothing to process"
            );
            return Ok(None);
        };
        if !action.binds(task.id) {
            warn!(
                task.id = %task_id,
                action.id = %action.id,
                "task is not among the action's bound tasks, nothing to process"
            );
            return Ok(None);
        }
        let Some(assignment) = self.lookup_assignment_for_history(history_id, action.workflow_id)?
        else {
            debug!(
                history.id = %history_id,
                task.id = %task_id,
                "no assignment behind history record"
            );
            return Ok(None);
        };

        let config = self.load_or_init_config(task.id)?;
        self.evaluate_and_transition(
            assignment.resource_id,
            &assignment.resource_type,
            &task,
            &config,
            action.workflow_id,
            assignment.state.id,
            locale,
        )
    }
}
