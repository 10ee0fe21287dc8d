//! Configuration management with environment variable support and validation.

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::store::PersistPolicy;

/// Where the record files live and when they are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub contacts_path: PathBuf,
    pub tasks_path: PathBuf,
    pub persist: PersistPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            contacts_path: PathBuf::from("contacts.json"),
            tasks_path: PathBuf::from("tasks.json"),
            persist: PersistPolicy::Immediate,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load settings from the built-in defaults, an optional local
    /// `keeper.toml`, an optional explicit file and `KEEPER_*` variables.
    pub fn load(extra: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(File::from_str(
                include_str!("../config.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(File::with_name("keeper").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("KEEPER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?;

        let mut settings: Settings = config
            .try_deserialize()
            .context("invalid configuration")?;

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("KEEPER_CONTACTS_PATH") {
            self.storage.contacts_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("KEEPER_TASKS_PATH") {
            self.storage.tasks_path = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var("KEEPER_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.contacts_path.as_os_str().is_empty() {
            return Err(anyhow!("storage.contacts_path cannot be empty"));
        }
        if self.storage.tasks_path.as_os_str().is_empty() {
            return Err(anyhow!("storage.tasks_path cannot be empty"));
        }
        if self.storage.contacts_path == self.storage.tasks_path {
            return Err(anyhow!(
                "contacts and tasks cannot share a file: {}",
                self.storage.tasks_path.display()
            ));
        }

        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => return Err(anyhow!("unknown logging.format '{}', expected text or json", other)),
        }

        for path in [&self.storage.contacts_path, &self.storage.tasks_path] {
            if path.is_dir() {
                warn!("record path is a directory: {:?}", path);
            }
        }

        Ok(())
    }
}
