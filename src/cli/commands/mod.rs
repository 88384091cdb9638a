use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::choose_state::{
    AppliedTransition, ChooseStateService, ControllerRegistry, LoggingReflexiveRunner,
};
use crate::store::{JsonFileStore, Stores};
use crate::workflows::Locale;

pub mod catalog;
pub mod run;
pub mod seed;
pub mod settings;
pub mod task_config;

pub use catalog::{ControllersCommand, StatesCommand};
pub use run::{LookupCommand, ProcessCommand, TransitionCommand};
pub use seed::SeedDemoCommand;
pub use settings::WriteConfigCommand;
pub use task_config::{ConfigRemoveCommand, ConfigSetCommand, ConfigShowCommand};

pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Everything a command needs: the service over the JSON store, the store
/// itself for catalog reads, and the locale handed to cascades.
pub struct CommandContext {
    pub service: ChooseStateService,
    pub store: Arc<JsonFileStore>,
    pub locale: Locale,
}

impl CommandContext {
    pub fn open(store_path: &Path, locale: Locale) -> Result<Self> {
        let store = Arc::new(JsonFileStore::open(store_path)?);
        let service = ChooseStateService::new(
            Stores::from_backend(store.clone()),
            ControllerRegistry::with_builtins(),
            Arc::new(LoggingReflexiveRunner),
        );
        Ok(Self {
            service,
            store,
            locale,
        })
    }
}

pub(crate) fn print_outcome(applied: Option<&AppliedTransition>) {
    match applied {
        Some(applied) => println!(
            "✅ {}: state {} -> {} \"{}\" (history {})",
            applied.key,
            applied.from_state,
            applied.to_state.id,
            applied.to_state.name,
            applied.history_id
        ),
        None => println!("⏸️  No transition"),
    }
}
