use super::types::{Collaborators, UpdaterOptions};
use super::UpdaterError;
use crate::memory::SystemMemory;
use crate::remote::{Credentials, GitHubSource};
use crate::reset::ProcessRestart;
use crate::store::VersionStore;
use crate::tracked::{FetchContext, FileState, TrackedFile};
use crate::validate::Validator;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// Pause between applying updates and resetting, so pending output can flush
pub const RESET_DELAY: Duration = Duration::from_secs(1);

/// Keeps a set of files in step with their remote versions.
///
/// Any pass that promotes at least one file ends with a device reset, even
/// when only one of many files changed. Code already loaded in memory is
/// stale after a promotion, so restarting is the only consistent option.
pub struct UpdateOrchestrator {
    files: Vec<TrackedFile>,
    store: VersionStore,
    collaborators: Collaborators,
    update_interval: Option<Duration>,
    minimum_free_memory: u64,
    debug: bool,
    last_update: Option<Instant>,
    last_update_at: Option<DateTime<Utc>>,
    /// Promoted files whose store entry could not be written yet
    unsynced: BTreeSet<String>,
}

impl UpdateOrchestrator {
    /// Create an updater backed by GitHub, the OS memory probe and a
    /// process restart.
    pub async fn with_github(
        credentials: Credentials,
        api_base: &str,
        options: UpdaterOptions,
        validator: Arc<dyn Validator>,
    ) -> Result<Self, UpdaterError> {
        let collaborators = Collaborators {
            remote: Arc::new(GitHubSource::with_api_base(credentials, api_base)),
            validator,
            memory: Arc::new(SystemMemory::new()),
            reset: Arc::new(ProcessRestart::current()),
        };
        Self::new(options, collaborators).await
    }

    /// Create an updater.
    ///
    /// This:
    /// 1. Fingerprints the local copy of every configured file
    /// 2. Adds a store entry for each file that has none (existing entries
    ///    are left alone)
    /// 3. Runs a forced check if `update_on_initialization` is set
    pub async fn new(
        options: UpdaterOptions,
        collaborators: Collaborators,
    ) -> Result<Self, UpdaterError> {
        let mut files = Vec::new();
        let mut seen = HashSet::new();

        for (repository, names) in &options.repositories {
            for name in names {
                if !seen.insert(name.clone()) {
                    return Err(UpdaterError::DuplicateFile(name.clone()));
                }
                files.push(
                    TrackedFile::new(&options.work_dir, repository, name, options.save_backups)
                        .await?,
                );
            }
        }

        let store = VersionStore::new(&options.work_dir);
        for file in &files {
            if !store.exists(file.name()).await {
                store.create(file.name(), file.to_entry()).await?;
            }
        }

        info!(files = files.len(), store = %store.path().display(), "Updater ready");

        let mut updater = Self {
            files,
            store,
            collaborators,
            update_interval: options.update_interval,
            minimum_free_memory: options.minimum_free_memory,
            debug: options.debug,
            last_update: None,
            last_update_at: None,
            unsynced: BTreeSet::new(),
        };

        if options.update_on_initialization {
            updater.check(true).await?;
        }

        Ok(updater)
    }

    pub fn files(&self) -> &[TrackedFile] {
        &self.files
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// When the last pass that changed something finished
    pub fn last_update_at(&self) -> Option<DateTime<Utc>> {
        self.last_update_at
    }

    /// Run a pass if one is due, and reset the device if it changed anything.
    ///
    /// - `force` always runs a pass
    /// - with an interval, a pass runs only if none has succeeded yet or the
    ///   interval has elapsed since the last one; otherwise nothing is
    ///   fetched or written
    /// - without an interval, every call runs a pass
    ///
    /// Returns whether updates were applied.
    pub async fn check(&mut self, force: bool) -> Result<bool, UpdaterError> {
        let now = Instant::now();

        if !force {
            if let (Some(interval), Some(last)) = (self.update_interval, self.last_update) {
                if now.duration_since(last) < interval {
                    debug!("Update interval not yet expired");
                    return Ok(false);
                }
            }
        }

        self.check_and_apply(now).await
    }

    async fn check_and_apply(&mut self, now: Instant) -> Result<bool, UpdaterError> {
        let (changed, error) = self.run_pass().await;

        if changed {
            self.last_update = Some(now);
            self.last_update_at = Some(Utc::now());
            info!("Updates applied, resetting");
            sleep(RESET_DELAY).await;
            self.collaborators.reset.reset();
        } else {
            debug!("No updates found");
        }

        match error {
            Some(e) => Err(e),
            None => Ok(changed),
        }
    }

    /// Fetch every file, then promote every validated download.
    ///
    /// Fetch failures of one file are logged and the pass moves on.
    /// Promotion and store failures do not stop the remaining promotions;
    /// the first one is returned once the pass is over, even if other files
    /// were promoted.
    pub async fn reconcile_once(&mut self) -> Result<bool, UpdaterError> {
        let (changed, error) = self.run_pass().await;
        match error {
            Some(e) => Err(e),
            None => Ok(changed),
        }
    }

    /// One pass. Returns whether any live file was replaced, and the first
    /// promotion or store error.
    async fn run_pass(&mut self) -> (bool, Option<UpdaterError>) {
        let mut first_error = self.resync_store().await;

        let ctx = FetchContext {
            remote: self.collaborators.remote.as_ref(),
            validator: self.collaborators.validator.as_ref(),
            memory: self.collaborators.memory.as_ref(),
            minimum_free_memory: self.minimum_free_memory,
        };

        debug!("Pulling latest versions");
        for file in &mut self.files {
            debug!(file = %file.name(), "Fetching");
            if let Err(e) = file.fetch_latest(&ctx).await {
                warn!(file = %file.name(), error = %e, "Cannot update file");
            }
        }

        let mut changed = false;
        for file in &mut self.files {
            if !file.has_pending_update() || file.state() != FileState::StagedValid {
                continue;
            }

            debug!(
                file = %file.name(),
                current = %file.current_fingerprint(),
                latest = ?file.latest_fingerprint(),
                "Applying update"
            );
            if let Err(e) = file.promote().await {
                error!(file = %file.name(), error = %e, "Promotion failed");
                keep_first(&mut first_error, e);
                continue;
            }

            // The live file is replaced from here on
            changed = true;
            if let Err(e) = self.store.update(file.name(), file.to_entry()).await {
                error!(file = %file.name(), error = %e, "Failed to record promoted version");
                self.unsynced.insert(file.name().to_string());
                keep_first(&mut first_error, e);
            }
        }

        if self.debug {
            for file in &self.files {
                info!(
                    file = %file.name(),
                    state = ?file.state(),
                    current = %file.current_fingerprint(),
                    latest = ?file.latest_fingerprint(),
                    "File status"
                );
            }
        }

        (changed, first_error)
    }

    /// Retry store writes that failed after an earlier promotion
    async fn resync_store(&mut self) -> Option<UpdaterError> {
        let mut first_error = None;
        let names: Vec<String> = self.unsynced.iter().cloned().collect();

        for name in names {
            let Some(entry) = self
                .files
                .iter()
                .find(|f| f.name() == name)
                .map(|f| f.to_entry())
            else {
                self.unsynced.remove(&name);
                continue;
            };

            match self.store.update(&name, entry).await {
                Ok(()) => {
                    info!(file = %name, "Recorded promoted version");
                    self.unsynced.remove(&name);
                }
                Err(e) => {
                    error!(file = %name, error = %e, "Failed to record promoted version");
                    keep_first(&mut first_error, e);
                }
            }
        }

        first_error
    }
}

fn keep_first(slot: &mut Option<UpdaterError>, error: impl Into<UpdaterError>) {
    if slot.is_none() {
        *slot = Some(error.into());
    }
}
