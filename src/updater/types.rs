use crate::memory::{MemoryBudget, DEFAULT_MINIMUM_FREE_MEMORY};
use crate::remote::RemoteSource;
use crate::reset::DeviceReset;
use crate::validate::Validator;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How the updater behaves
#[derive(Debug, Clone)]
pub struct UpdaterOptions {
    /// Directory holding the tracked files and the version store
    pub work_dir: PathBuf,

    /// Repository (`owner/name`) -> files to track from it
    pub repositories: BTreeMap<String, Vec<String>>,

    /// Minimum spacing between passes. `None` runs a pass on every check.
    pub update_interval: Option<Duration>,

    /// Run a forced check while constructing the updater
    pub update_on_initialization: bool,

    /// Log a fingerprint summary of every file after each pass
    pub debug: bool,

    /// Keep the previous live copy as `__backup__<name>` on promotion
    pub save_backups: bool,

    /// Free memory floor in bytes for network calls
    pub minimum_free_memory: u64,
}

impl Default for UpdaterOptions {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            repositories: BTreeMap::new(),
            update_interval: None,
            update_on_initialization: false,
            debug: false,
            save_backups: false,
            minimum_free_memory: DEFAULT_MINIMUM_FREE_MEMORY,
        }
    }
}

/// External services the updater depends on
#[derive(Clone)]
pub struct Collaborators {
    pub remote: Arc<dyn RemoteSource>,
    pub validator: Arc<dyn Validator>,
    pub memory: Arc<dyn MemoryBudget>,
    pub reset: Arc<dyn DeviceReset>,
}
