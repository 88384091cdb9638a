use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use choose_state::cli::commands::{
    Command, CommandContext, ConfigRemoveCommand, ConfigSetCommand, ConfigShowCommand,
    ControllersCommand, LookupCommand, ProcessCommand, SeedDemoCommand, StatesCommand,
    TransitionCommand, WriteConfigCommand,
};
use choose_state::cli::{Cli, Commands, ConfigCommands};
use choose_state::config::{self, ChooseStateConfig};
use choose_state::telemetry::init_telemetry;
use choose_state::workflows::{ActionId, HistoryId, TaskId, WorkflowId};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => {
            ChooseStateConfig::load_env_file()?;
            ChooseStateConfig::load_from(path)?
        }
        None => config::config()?.clone(),
    };
    init_telemetry(&settings.observability)?;
    if cli.config.is_none() {
        config::init_config()?;
    }

    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.store.path));
    let ctx = CommandContext::open(&store_path, settings.default_locale())?;

    let command: Box<dyn Command> = match cli.command {
        Commands::Controllers => Box::new(ControllersCommand),
        Commands::States { action } => Box::new(StatesCommand {
            action_id: ActionId(action),
        }),
        Commands::Config { command } => match command {
            ConfigCommands::Show { task } => Box::new(ConfigShowCommand {
                task_id: TaskId(task),
            }),
            ConfigCommands::Set {
                task,
                controller,
                ok,
                ko,
            } => Box::new(ConfigSetCommand {
                task_id: TaskId(task),
                controller,
                ok,
                ko,
            }),
            ConfigCommands::Remove { task } => Box::new(ConfigRemoveCommand {
                task_id: TaskId(task),
            }),
        },
        Commands::Transition {
            resource,
            resource_type,
            task,
        } => Box::new(TransitionCommand {
            resource_id: resource,
            resource_type,
            task_id: TaskId(task),
        }),
        Commands::Process { history, task } => Box::new(ProcessCommand {
            history_id: HistoryId(history),
            task_id: TaskId(task),
        }),
        Commands::Lookup {
            history,
            workflow,
            task,
        } => Box::new(LookupCommand {
            history_id: HistoryId(history),
            workflow_id: WorkflowId(workflow),
            task_id: task.map(TaskId),
        }),
        Commands::SeedDemo { force } => Box::new(SeedDemoCommand { force }),
        Commands::WriteConfig { path, force } => Box::new(WriteConfigCommand {
            settings: settings.clone(),
            path,
            force,
        }),
    };

    command.execute(&ctx)
}
