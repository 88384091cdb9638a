use anyhow::Result;
use tracing::warn;

use super::{print_outcome, Command, CommandContext};
use crate::store::{ResourceHistoryStore, ResourceWorkflowStore, WorkflowCatalog};
use crate::workflows::{HistoryId, ResourceKey, TaskId, WorkflowId};

/// Evaluate a task for a resource given by id and type.
pub struct TransitionCommand {
    pub resource_id: i32,
    pub resource_type: String,
    pub task_id: TaskId,
}

impl Command for TransitionCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(task) = ctx.store.find_task(self.task_id)? else {
            warn!(task.id = %self.task_id, "task not found");
            print_outcome(None);
            return Ok(());
        };
        let Some(action) = ctx.store.find_action(task.action_id)? else {
            warn!(task.id = %task.id, action.id = %task.action_id, "task action not found");
            print_outcome(None);
            return Ok(());
        };

        if !action.binds(task.id) {
            warn!(task.id = %task.id, action.id = %action.id, "task is not bound to its action");
            print_outcome(None);
            return Ok(());
        }

        let key = ResourceKey::new(self.resource_id, &self.resource_type, action.workflow_id);
        let Some(assignment) = ctx.store.find_assignment(&key)? else {
            warn!(resource = %key, "{key} has no workflow assignment");
            print_outcome(None);
            return Ok(());
        };

        let config = ctx.service.load_or_init_config(task.id)?;
        let applied = ctx.service.evaluate_and_transition(
            self.resource_id,
            &self.resource_type,
            &task,
            &config,
            action.workflow_id,
            assignment.state.id,
            &ctx.locale,
        )?;
        print_outcome(applied.as_ref());
        Ok(())
    }
}

/// Evaluate a task for the resource a history record is about.
pub struct ProcessCommand {
    pub history_id: HistoryId,
    pub task_id: TaskId,
}

impl Command for ProcessCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let applied = ctx
            .service
            .process_task(self.history_id, self.task_id, &ctx.locale)?;
        print_outcome(applied.as_ref());
        Ok(())
    }
}

pub struct LookupCommand {
    pub history_id: HistoryId,
    pub workflow_id: WorkflowId,
    pub task_id: Option<TaskId>,
}

impl Command for LookupCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match ctx
            .service
            .lookup_assignment_for_history(self.history_id, self.workflow_id)?
        {
            Some(assignment) => println!(
                "🔎 {}: state {} \"{}\"",
                assignment.key(),
                assignment.state.id,
                assignment.state.name
            ),
            None => println!(
                "🔎 No assignment behind history {} in workflow {}",
                self.history_id, self.workflow_id
            ),
        }

        if let Some(record) = ctx.store.find_history(self.history_id)? {
            let origin = if record.is_automatic() { "automatic" } else { "manual" };
            println!(
                "   history {}: action {} recorded by {} ({origin}) at {}",
                record.id,
                record.action_id,
                record.user_access_code,
                record.created_at.to_rfc3339()
            );
        }

        if let Some(task_id) = self.task_id {
            match ctx.service.task_information(self.history_id, task_id)? {
                Some(info) => println!("   task {task_id} reached \"{}\"", info.new_state),
                None => println!("   task {task_id} left no record on history {}", self.history_id),
            }
        }
        Ok(())
    }
}
