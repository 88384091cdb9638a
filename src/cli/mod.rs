use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "choose-state")]
#[command(about = "Move workflow resources to the OK or KO state a named controller picks")]
#[command(long_about = "choose-state runs the choose-state workflow task against a JSON \
                       store: a task's controller evaluates a resource and the resource moves \
                       to the task's OK or KO state, with history and audit rows written \
                       atomically. Start with 'choose-state seed-demo' to create a small demo \
                       store.")]
pub struct Cli {
    /// Configuration file (defaults to choose-state.toml and CHOOSE_STATE__* variables)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store file, overriding store.path from the configuration
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the controllers a task can be configured with
    Controllers,
    /// List the target states selectable for a task bound to an action
    States {
        /// Action the task is bound to
        action: i32,
    },
    /// Show or edit a task's configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Evaluate a task against a resource and transition it if the controller says so
    Transition {
        /// Resource id
        #[arg(long)]
        resource: i32,
        /// Resource type
        #[arg(long = "resource-type")]
        resource_type: String,
        /// Choose-state task to run
        #[arg(long)]
        task: i32,
    },
    /// Run a task for the resource a history record is about
    Process {
        /// History record produced by the action the task is bound to
        #[arg(long)]
        history: i32,
        /// Choose-state task to run
        #[arg(long)]
        task: i32,
    },
    /// Show the assignment of the resource behind a history record
    Lookup {
        /// History record
        #[arg(long)]
        history: i32,
        /// Workflow of the assignment
        #[arg(long)]
        workflow: i32,
        /// Also show the audit row this task left on the record
        #[arg(long)]
        task: Option<i32>,
    },
    /// Write the effective configuration to a TOML file
    WriteConfig {
        /// Destination file
        #[arg(default_value = "choose-state.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long, help = "Replace an existing configuration file")]
        force: bool,
    },
    /// Write a small demo workflow into the store
    SeedDemo {
        /// Overwrite a store that already has content
        #[arg(long, help = "Replace existing store content")]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show a task's configuration, creating the default one on first access
    Show {
        task: i32,
    },
    /// Set a task's controller and target states (-1 leaves an outcome without transition)
    Set {
        task: i32,
        #[arg(long)]
        controller: String,
        #[arg(long, allow_negative_numbers = true, default_value_t = -1)]
        ok: i32,
        #[arg(long, allow_negative_numbers = true, default_value_t = -1)]
        ko: i32,
    },
    /// Remove a task's configuration and audit rows
    Remove {
        task: i32,
    },
}
