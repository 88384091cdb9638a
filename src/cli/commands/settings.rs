use anyhow::{bail, Result};
use std::path::PathBuf;

use super::{Command, CommandContext};
use crate::config::ChooseStateConfig;

/// Write the settings the process runs with, so they can be edited.
pub struct WriteConfigCommand {
    pub settings: ChooseStateConfig,
    pub path: PathBuf,
    pub force: bool,
}

impl Command for WriteConfigCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "{} already exists, use --force to replace it",
                self.path.display()
            );
        }
        self.settings.save_to_file(&self.path)?;
        println!("💾 Configuration written to {}", self.path.display());
        println!("   locale: {}", self.settings.i18n.default_locale);
        println!("   store:  {}", self.settings.store.path);
        Ok(())
    }
}
