use crate::memory::DEFAULT_MINIMUM_FREE_MEMORY;
use crate::remote::DEFAULT_API_BASE;
use crate::updater::UpdaterOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn default_minimum_free_memory() -> u64 {
    DEFAULT_MINIMUM_FREE_MEMORY
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Updater configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtaConfig {
    /// Repository (`owner/name`) -> files to keep up to date
    #[serde(default)]
    pub repositories: BTreeMap<String, Vec<String>>,

    /// Minutes between update passes. Leave unset to check on every run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval_minutes: Option<u64>,

    #[serde(default)]
    pub update_on_initialization: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub save_backups: bool,

    /// Free memory floor in bytes
    #[serde(default = "default_minimum_free_memory")]
    pub minimum_free_memory: u64,

    /// Checker command run against each download, e.g.
    /// `["python3", "-m", "py_compile"]`. Empty accepts everything.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validator: Vec<String>,

    #[serde(default = "default_api_base")]
    pub api_base_url: String,
}

impl Default for OtaConfig {
    fn default() -> Self {
        Self {
            repositories: BTreeMap::new(),
            update_interval_minutes: None,
            update_on_initialization: false,
            debug: false,
            save_backups: false,
            minimum_free_memory: default_minimum_free_memory(),
            validator: Vec::new(),
            api_base_url: default_api_base(),
        }
    }
}

impl OtaConfig {
    /// Updater options for files living in `work_dir`
    pub fn to_options(&self, work_dir: PathBuf) -> UpdaterOptions {
        UpdaterOptions {
            work_dir,
            repositories: self.repositories.clone(),
            update_interval: self
                .update_interval_minutes
                .map(|minutes| Duration::from_secs(minutes.saturating_mul(60))),
            update_on_initialization: self.update_on_initialization,
            debug: self.debug,
            save_backups: self.save_backups,
            minimum_free_memory: self.minimum_free_memory,
        }
    }
}

/// Read the configuration file
pub async fn read_config(config_path: &Path) -> Result<Option<OtaConfig>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(config_path).await?;
    let config: OtaConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Write the configuration file
pub async fn write_config(config_path: &Path, config: &OtaConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content).await?;
    Ok(())
}
