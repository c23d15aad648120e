use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    core::LedgerRegistry,
    errors::{LedgerError, Result},
    ledger::RecordDefaults,
    storage::{json_backend::DEFAULT_RETENTION, JsonStorage},
    utils::{
        paths,
        persistence::{ensure_dir, replace_file},
    },
};

/// Engine settings persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding `<name>_records.json` files. Defaults to `~/.ledger_core/ledgers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(default = "EngineConfig::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default)]
    pub defaults: RecordDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            backup_retention: Self::default_backup_retention(),
            defaults: RecordDefaults::default(),
        }
    }
}

impl EngineConfig {
    fn default_backup_retention() -> usize {
        DEFAULT_RETENTION
    }

    pub fn resolved_storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(paths::ledgers_dir)
    }

    pub fn open_storage(&self) -> Result<JsonStorage> {
        JsonStorage::with_retention(self.resolved_storage_dir(), self.backup_retention)
    }

    /// A registry over JSON storage that applies the configured record defaults.
    pub fn registry(&self) -> Result<LedgerRegistry> {
        let storage = self.open_storage()?;
        Ok(LedgerRegistry::new(Arc::new(storage)).with_defaults(self.defaults.clone()))
    }
}

/// Reads and writes [`EngineConfig`] at `<base>/config/config.json`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        let path = paths::config_file_in(base);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored settings, or the defaults when no file exists yet.
    pub fn load(&self) -> Result<EngineConfig> {
        if !self.path.exists() {
            return Ok(EngineConfig::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Config(format!("`{}` is invalid: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &EngineConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| LedgerError::Config(err.to_string()))?;
        replace_file(&self.path, json.as_bytes())
    }
}
