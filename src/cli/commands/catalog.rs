use anyhow::Result;

use super::{Command, CommandContext};
use crate::store::WorkflowCatalog;
use crate::workflows::ActionId;

pub struct ControllersCommand;

impl Command for ControllersCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let names = ctx.service.controller_names();
        if names.is_empty() {
            println!("No controllers registered");
            return Ok(());
        }
        println!("🎛️  {} controllers registered:", names.len());
        for name in names {
            println!("   {name}");
        }
        Ok(())
    }
}

pub struct StatesCommand {
    pub action_id: ActionId,
}

impl Command for StatesCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let Some(action) = ctx.store.find_action(self.action_id)? else {
            println!("⚠️  Action {} not found", self.action_id);
            return Ok(());
        };
        let workflow = ctx
            .store
            .find_workflow(action.workflow_id)?
            .map_or_else(String::new, |w| format!(" \"{}\"", w.name));
        println!(
            "📋 States of workflow {}{workflow} for action \"{}\":",
            action.workflow_id, action.name
        );
        for state in ctx.service.list_selectable_states(self.action_id)? {
            let label = if state.id.is_none() {
                "(no transition)"
            } else {
                state.label.as_str()
            };
            println!("{:>4}  {label}", state.raw_id());
        }
        Ok(())
    }
}
