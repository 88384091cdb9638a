use anyhow::Result;

use super::{Command, CommandContext};
use crate::workflows::{StateId, TaskConfig, TaskId, UNSET_STATE_ID};

fn print_config(config: &TaskConfig) {
    let controller = if config.controller_name.is_empty() {
        "(none)"
    } else {
        config.controller_name.as_str()
    };
    let raw = |target: Option<StateId>| target.map_or(UNSET_STATE_ID, |id| id.0);

    println!("📋 Task {}", config.task_id);
    println!("   controller: {controller}");
    println!("   ok state:   {}", raw(config.id_state_ok));
    println!("   ko state:   {}", raw(config.id_state_ko));
}

pub struct ConfigShowCommand {
    pub task_id: TaskId,
}

impl Command for ConfigShowCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.service.load_or_init_config(self.task_id)?;
        print_config(&config);
        Ok(())
    }
}

pub struct ConfigSetCommand {
    pub task_id: TaskId,
    pub controller: String,
    pub ok: i32,
    pub ko: i32,
}

impl Command for ConfigSetCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let config = TaskConfig {
            task_id: self.task_id,
            controller_name: self.controller.clone(),
            id_state_ok: StateId::from_raw(self.ok),
            id_state_ko: StateId::from_raw(self.ko),
        };
        ctx.service.save_config(&config)?;

        if ctx.service.registry().resolve(&config.controller_name).is_none() {
            println!(
                "⚠️  Controller '{}' is not registered; the task will not transition",
                config.controller_name
            );
        }
        println!("💾 Saved");
        print_config(&config);
        Ok(())
    }
}

pub struct ConfigRemoveCommand {
    pub task_id: TaskId,
}

impl Command for ConfigRemoveCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        ctx.service.remove_task(self.task_id)?;
        println!("🗑️  Removed configuration of task {}", self.task_id);
        Ok(())
    }
}
