use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cascade::ReflexiveActionRunner;
use super::ChooseStateError;
use crate::store::{
    ResourceWorkflowStore, StoreError, TransitionStore, TransitionWrite, WorkflowCatalog,
};
use crate::workflows::{
    HistoryId, Locale, NewResourceHistory, ResourceKey, StateId, Task, WorkflowState,
};

/// What a committed transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTransition {
    pub history_id: HistoryId,
    pub key: ResourceKey,
    pub from_state: StateId,
    pub to_state: WorkflowState,
}

/// Performs a decided transition: history, assignment, task information,
/// then the reflexive action cascade of the new state.
pub struct TransitionExecutor {
    catalog: Arc<dyn WorkflowCatalog>,
    assignments: Arc<dyn ResourceWorkflowStore>,
    transitions: Arc<dyn TransitionStore>,
    cascade: Arc<dyn ReflexiveActionRunner>,
}

impl TransitionExecutor {
    pub fn new(
        catalog: Arc<dyn WorkflowCatalog>,
        assignments: Arc<dyn ResourceWorkflowStore>,
        transitions: Arc<dyn TransitionStore>,
        cascade: Arc<dyn ReflexiveActionRunner>,
    ) -> Self {
        Self {
            catalog,
            assignments,
            transitions,
            cascade,
        }
    }

    /// Commit and cascade in one call.
    pub fn apply(
        &self,
        task: &Task,
        key: &ResourceKey,
        target: StateId,
        locale: &Locale,
    ) -> Result<Option<AppliedTransition>, ChooseStateError> {
        let applied = self.commit(task, key, target)?;
        if let Some(applied) = &applied {
            self.cascade(applied, locale)?;
        }
        Ok(applied)
    }

    /// Resolve every reference, then write history, assignment and task
    /// information as one [`TransitionWrite`].
    ///
    /// A dangling reference (target state, task action, assignment) returns
    /// `Ok(None)` before anything is written. So does a stored assignment
    /// already sitting in the target, or one the store reports as moved or
    /// removed since it was read, which happens when a concurrent write on the
    /// same key got there first.
    pub fn commit(
        &self,
        task: &Task,
        key: &ResourceKey,
        target: StateId,
    ) -> Result<Option<AppliedTransition>, ChooseStateError> {
        let Some(state) = self.catalog.find_state(target)? else {
            warn!(
                task.id = %task.id,
                state.id = %target,
                "target state not found, no transition"
            );
            return Ok(None);
        };
        let Some(action) = self.catalog.find_action(task.action_id)? else {
            warn!(
                task.id = %task.id,
                action.id = %task.action_id,
                "task action not found, no transition"
            );
            return Ok(None);
        };
        if state.workflow_id != key.workflow_id {
            warn!(
                task.id = %task.id,
                state.id = %state.id,
                state.workflow = %state.workflow_id,
                resource = %key,
                "target state belongs to another workflow, no transition"
            );
            return Ok(None);
        }
        let Some(mut assignment) = self.assignments.find_assignment(key)? else {
            warn!(
                task.id = %task.id,
                resource = %key,
                "resource has no workflow assignment, no transition"
            );
            return Ok(None);
        };

        let from_state = assignment.state.id;
        if from_state == state.id {
            debug!(
                task.id = %task.id,
                resource = %key,
                state.id = %from_state,
                "resource already in target state"
            );
            return Ok(None);
        }
        assignment.state = state.clone();
        let write = TransitionWrite {
            history: NewResourceHistory::automatic(key, &action, Utc::now()),
            expected_state: from_state,
            assignment,
            task_id: task.id,
            new_state_name: state.name.clone(),
        };
        let history_id = match self.transitions.commit_transition(write) {
            Ok(history_id) => history_id,
            // Another process moved or dropped the resource between our read and the write
            Err(StoreError::StaleAssignment { actual, .. }) => {
                debug!(
                    task.id = %task.id,
                    resource = %key,
                    state.id = %actual,
                    "assignment moved concurrently, no transition"
                );
                return Ok(None);
            }
            Err(StoreError::AssignmentNotFound(_)) => {
                warn!(
                    task.id = %task.id,
                    resource = %key,
                    "assignment removed concurrently, no transition"
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            task.id = %task.id,
            resource = %key,
            from = %from_state,
            to = %state.id,
            history.id = %history_id,
            "state transition committed"
        );

        Ok(Some(AppliedTransition {
            history_id,
            key: key.clone(),
            from_state,
            to_state: state,
        }))
    }

    /// Run the reflexive actions of the state just entered. Errors are the
    /// cascade's own and are passed through.
    pub fn cascade(
        &self,
        applied: &AppliedTransition,
        locale: &Locale,
    ) -> Result<(), ChooseStateError> {
        self.cascade
            .run_automatic_reflexive_actions(
                applied.key.resource_id,
                &applied.key.resource_type,
                applied.to_state.id,
                locale,
            )
            .map_err(ChooseStateError::Cascade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choose_state::cascade::MockReflexiveActionRunner;
    use crate::store::{MockResourceWorkflowStore, MockTransitionStore, MockWorkflowCatalog};
    use crate::workflows::{
        Action, ActionId, ResourceWorkflowAssignment, TaskId, WorkflowId, AUTOMATIC_ACTOR,
    };
    use mockall::predicate::eq;

    fn task() -> Task {
        Task {
            id: TaskId(3),
            action_id: ActionId(9),
            task_type: "taskChooseState".to_string(),
        }
    }

    fn key() -> ResourceKey {
        ResourceKey::new(42, "ticket", WorkflowId(1))
    }

    fn state(id: i32, name: &str) -> WorkflowState {
        WorkflowState {
            id: StateId(id),
            name: name.to_string(),
            workflow_id: WorkflowId(1),
        }
    }

    fn action() -> Action {
        Action::new(ActionId(9), "Check", WorkflowId(1))
    }

    fn assignment_in(state: WorkflowState) -> ResourceWorkflowAssignment {
        ResourceWorkflowAssignment {
            resource_id: 42,
            resource_type: "ticket".to_string(),
            workflow_id: WorkflowId(1),
            state,
            external_parent_id: None,
        }
    }

    fn executor(
        catalog: MockWorkflowCatalog,
        assignments: MockResourceWorkflowStore,
        transitions: MockTransitionStore,
        cascade: MockReflexiveActionRunner,
    ) -> TransitionExecutor {
        TransitionExecutor::new(
            Arc::new(catalog),
            Arc::new(assignments),
            Arc::new(transitions),
            Arc::new(cascade),
        )
    }

    fn untouched_stores() -> (
        MockResourceWorkflowStore,
        MockTransitionStore,
        MockReflexiveActionRunner,
    ) {
        let mut assignments = MockResourceWorkflowStore::new();
        assignments.expect_find_assignment().never();
        let mut transitions = MockTransitionStore::new();
        transitions.expect_commit_transition().never();
        let mut cascade = MockReflexiveActionRunner::new();
        cascade.expect_run_automatic_reflexive_actions().never();
        (assignments, transitions, cascade)
    }

    #[test]
    fn test_missing_state_aborts_without_writes() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog.expect_find_state().returning(|_| Ok(None));
        catalog.expect_find_action().returning(|_| Ok(Some(action())));
        let (assignments, transitions, cascade) = untouched_stores();

        let applied = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap();

        assert!(applied.is_none());
    }

    #[test]
    fn test_missing_action_aborts_without_writes() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog
            .expect_find_state()
            .returning(|_| Ok(Some(state(5, "Accepted"))));
        catalog.expect_find_action().returning(|_| Ok(None));
        let (assignments, transitions, cascade) = untouched_stores();

        let applied = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap();

        assert!(applied.is_none());
    }

    #[test]
    fn test_state_of_other_workflow_aborts_without_writes() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog.expect_find_state().returning(|_| {
            Ok(Some(WorkflowState {
                id: StateId(5),
                name: "Elsewhere".to_string(),
                workflow_id: WorkflowId(2),
            }))
        });
        catalog.expect_find_action().returning(|_| Ok(Some(action())));
        let (assignments, transitions, cascade) = untouched_stores();

        let applied = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap();

        assert!(applied.is_none());
    }

    #[test]
    fn test_missing_assignment_aborts_without_writes() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog
            .expect_find_state()
            .returning(|_| Ok(Some(state(5, "Accepted"))));
        catalog.expect_find_action().returning(|_| Ok(Some(action())));
        let mut assignments = MockResourceWorkflowStore::new();
        assignments.expect_find_assignment().times(1).returning(|_| Ok(None));
        let mut transitions = MockTransitionStore::new();
        transitions.expect_commit_transition().never();
        let mut cascade = MockReflexiveActionRunner::new();
        cascade.expect_run_automatic_reflexive_actions().never();

        let applied = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap();

        assert!(applied.is_none());
    }

    #[test]
    fn test_stored_assignment_already_in_target_writes_nothing() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog
            .expect_find_state()
            .returning(|_| Ok(Some(state(5, "Accepted"))));
        catalog.expect_find_action().returning(|_| Ok(Some(action())));
        let mut assignments = MockResourceWorkflowStore::new();
        assignments
            .expect_find_assignment()
            .returning(|_| Ok(Some(assignment_in(state(5, "Accepted")))));
        let mut transitions = MockTransitionStore::new();
        transitions.expect_commit_transition().never();
        let mut cascade = MockReflexiveActionRunner::new();
        cascade.expect_run_automatic_reflexive_actions().never();

        let applied = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap();

        assert!(applied.is_none());
    }

    #[test]
    fn test_commit_writes_one_linked_transition_then_cascades() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog
            .expect_find_state()
            .with(eq(StateId(5)))
            .returning(|_| Ok(Some(state(5, "Accepted"))));
        catalog
            .expect_find_action()
            .with(eq(ActionId(9)))
            .returning(|_| Ok(Some(action())));
        let mut assignments = MockResourceWorkflowStore::new();
        assignments
            .expect_find_assignment()
            .returning(|_| Ok(Some(assignment_in(state(3, "Pending")))));
        let mut transitions = MockTransitionStore::new();
        transitions
            .expect_commit_transition()
            .times(1)
            .withf(|write| {
                write.task_id == TaskId(3)
                    && write.expected_state == StateId(3)
                    && write.new_state_name == "Accepted"
                    && write.assignment.state.id == StateId(5)
                    && write.history.action_id == ActionId(9)
                    && write.history.user_access_code == AUTOMATIC_ACTOR
            })
            .returning(|_| Ok(HistoryId(17)));
        let mut cascade = MockReflexiveActionRunner::new();
        cascade
            .expect_run_automatic_reflexive_actions()
            .times(1)
            .withf(|resource_id, resource_type, state_id, locale| {
                *resource_id == 42
                    && resource_type == "ticket"
                    && *state_id == StateId(5)
                    && locale.as_str() == "fr"
            })
            .returning(|_, _, _, _| Ok(()));

        let applied = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("fr"))
            .unwrap()
            .unwrap();

        assert_eq!(applied.history_id, HistoryId(17));
        assert_eq!(applied.from_state, StateId(3));
        assert_eq!(applied.to_state.id, StateId(5));
    }

    #[test]
    fn test_store_failure_is_surfaced_and_skips_cascade() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog
            .expect_find_state()
            .returning(|_| Ok(Some(state(5, "Accepted"))));
        catalog.expect_find_action().returning(|_| Ok(Some(action())));
        let mut assignments = MockResourceWorkflowStore::new();
        assignments
            .expect_find_assignment()
            .returning(|_| Ok(Some(assignment_in(state(3, "Pending")))));
        let mut transitions = MockTransitionStore::new();
        transitions.expect_commit_transition().returning(|_| {
            Err(StoreError::Lock {
                reason: "disk full".to_string(),
            })
        });
        let mut cascade = MockReflexiveActionRunner::new();
        cascade.expect_run_automatic_reflexive_actions().never();

        let err = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap_err();

        assert!(matches!(err, ChooseStateError::Store(_)));
    }

    #[test]
    fn test_assignment_moved_before_write_is_a_no_op() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog
            .expect_find_state()
            .returning(|_| Ok(Some(state(5, "Accepted"))));
        catalog.expect_find_action().returning(|_| Ok(Some(action())));
        let mut assignments = MockResourceWorkflowStore::new();
        assignments
            .expect_find_assignment()
            .returning(|_| Ok(Some(assignment_in(state(3, "Pending")))));
        let mut transitions = MockTransitionStore::new();
        transitions.expect_commit_transition().returning(|write| {
            Err(StoreError::StaleAssignment {
                key: write.assignment.key(),
                expected: write.expected_state,
                actual: StateId(5),
            })
        });
        let mut cascade = MockReflexiveActionRunner::new();
        cascade.expect_run_automatic_reflexive_actions().never();

        let applied = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap();

        assert!(applied.is_none());
    }

    #[test]
    fn test_assignment_removed_before_write_is_a_no_op() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog
            .expect_find_state()
            .returning(|_| Ok(Some(state(5, "Accepted"))));
        catalog.expect_find_action().returning(|_| Ok(Some(action())));
        let mut assignments = MockResourceWorkflowStore::new();
        assignments
            .expect_find_assignment()
            .returning(|_| Ok(Some(assignment_in(state(3, "Pending")))));
        let mut transitions = MockTransitionStore::new();
        transitions
            .expect_commit_transition()
            .times(1)
            .returning(|write| Err(StoreError::AssignmentNotFound(write.assignment.key())));
        let mut cascade = MockReflexiveActionRunner::new();
        cascade.expect_run_automatic_reflexive_actions().never();

        let applied = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap();

        assert!(applied.is_none());
    }

    #[test]
    fn test_cascade_failure_is_passed_through() {
        let mut catalog = MockWorkflowCatalog::new();
        catalog
            .expect_find_state()
            .returning(|_| Ok(Some(state(5, "Accepted"))));
        catalog.expect_find_action().returning(|_| Ok(Some(action())));
        let mut assignments = MockResourceWorkflowStore::new();
        assignments
            .expect_find_assignment()
            .returning(|_| Ok(Some(assignment_in(state(3, "Pending")))));
        let mut transitions = MockTransitionStore::new();
        transitions
            .expect_commit_transition()
            .times(1)
            .returning(|_| Ok(HistoryId(1)));
        let mut cascade = MockReflexiveActionRunner::new();
        cascade
            .expect_run_automatic_reflexive_actions()
            .returning(|_, _, _, _| Err(anyhow::anyhow!("reflexive action 12 failed")));

        let err = executor(catalog, assignments, transitions, cascade)
            .apply(&task(), &key(), StateId(5), &Locale::new("en"))
            .unwrap_err();

        assert!(matches!(err, ChooseStateError::Cascade(_)));
        assert!(err.to_string().contains("reflexive action 12 failed"));
    }
}
