use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::workflows::Locale;

/// Main configuration structure for choose-state
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChooseStateConfig {
    /// Locale settings
    pub i18n: I18nConfig,
    /// Store settings
    pub store: StoreConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct I18nConfig {
    /// Locale for text produced during reflexive action cascades
    pub default_locale: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Path of the JSON store file
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ChooseStateConfig {
    fn default() -> Self {
        Self {
            i18n: I18nConfig {
                default_locale: "en".to_string(),
            },
            store: StoreConfig {
                path: ".choose-state/store.json".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl ChooseStateConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (choose-state.toml in the working directory)
    /// 3. Environment variables (prefixed with CHOOSE_STATE__, sections split by `__`)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("choose-state.toml"))
    }

    /// Same as [`ChooseStateConfig::load`] with an explicit file; a missing file is skipped.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("CHOOSE_STATE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Locale threaded into transitions and cascades
    pub fn default_locale(&self) -> Locale {
        Locale::new(self.i18n.default_locale.clone())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<ChooseStateConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = ChooseStateConfig::load_env_file();
        ChooseStateConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static ChooseStateConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let config = config()?;
    tracing::info!(locale = %config.i18n.default_locale, "Configuration loaded successfully");
    Ok(())
}
