use super::types::FileState;
use super::FileError;
use crate::memory::MemoryBudget;
use crate::remote::{RemoteResponse, RemoteSource, SourceLocator};
use crate::store::VersionEntry;
use crate::utils::{
    compute_blob_fingerprint, compute_file_fingerprint, prefixed_path, BACKUP_FILE_PREFIX,
    ERROR_FILE_PREFIX, LATEST_FILE_PREFIX,
};
use crate::validate::Validator;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Collaborators a fetch needs
pub struct FetchContext<'a> {
    pub remote: &'a dyn RemoteSource,
    pub validator: &'a dyn Validator,
    pub memory: &'a dyn MemoryBudget,
    /// Free memory floor in bytes
    pub minimum_free_memory: u64,
}

impl FetchContext<'_> {
    fn check_memory(&self) -> Result<(), FileError> {
        let free = self.memory.free_memory();
        if free < self.minimum_free_memory {
            return Err(FileError::InsufficientMemory {
                free,
                floor: self.minimum_free_memory,
            });
        }
        Ok(())
    }
}

/// A local file kept in step with a file in a remote repository
#[derive(Debug)]
pub struct TrackedFile {
    name: String,
    locator: SourceLocator,
    work_dir: PathBuf,
    save_backups: bool,
    current: String,
    latest: Option<String>,
    staged: Option<PathBuf>,
    state: FileState,
}

impl TrackedFile {
    /// Start tracking `name` (relative to `work_dir`) against `repository`.
    ///
    /// The current fingerprint is taken from the local file, or is empty if
    /// the file does not exist yet.
    pub async fn new(
        work_dir: &Path,
        repository: &str,
        name: &str,
        save_backups: bool,
    ) -> Result<Self, FileError> {
        let current = compute_file_fingerprint(&work_dir.join(name)).await?;
        debug!(file = name, current = %current, "Tracking file");

        Ok(Self {
            name: name.to_string(),
            locator: SourceLocator::new(repository, name),
            work_dir: work_dir.to_path_buf(),
            save_backups,
            current,
            latest: None,
            staged: None,
            state: FileState::Unchanged,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_fingerprint(&self) -> &str {
        &self.current
    }

    pub fn latest_fingerprint(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    pub fn staged_path(&self) -> Option<&Path> {
        self.staged.as_deref()
    }

    pub fn state(&self) -> FileState {
        self.state
    }

    pub fn live_path(&self) -> PathBuf {
        self.work_dir.join(&self.name)
    }

    pub fn backup_path(&self) -> PathBuf {
        prefixed_path(&self.work_dir, &self.name, BACKUP_FILE_PREFIX)
    }

    pub fn quarantine_path(&self) -> PathBuf {
        prefixed_path(&self.work_dir, &self.name, ERROR_FILE_PREFIX)
    }

    fn latest_path(&self) -> PathBuf {
        prefixed_path(&self.work_dir, &self.name, LATEST_FILE_PREFIX)
    }

    /// Store entry mirroring this file.
    ///
    /// Before the first fetch the latest fingerprint is taken to be the
    /// current one.
    pub fn to_entry(&self) -> VersionEntry {
        VersionEntry::new(
            self.current.clone(),
            self.latest.clone().unwrap_or_else(|| self.current.clone()),
        )
    }

    /// Does the remote hold a version other than the live one?
    pub fn has_pending_update(&self) -> bool {
        self.latest.as_deref() != Some(self.current.as_str())
    }

    /// Ask the remote for its version of the file and stage it if it differs.
    ///
    /// Unreadable responses and transport failures are logged and leave the
    /// file as it was, to be retried on the next pass.
    pub async fn fetch_latest(&mut self, ctx: &FetchContext<'_>) -> Result<(), FileError> {
        ctx.check_memory()?;
        let response = ctx.remote.fetch(&self.locator, &self.current).await;
        ctx.check_memory()?;

        let (fingerprint, content) = match response {
            Ok(RemoteResponse::Unchanged) => {
                self.mark_same(self.current.clone());
                return Ok(());
            }
            Ok(RemoteResponse::Updated { fingerprint, content }) => (fingerprint, content),
            Ok(RemoteResponse::Malformed(reason)) => {
                warn!(file = %self.name, source = %self.locator, %reason, "Malformed response");
                return Ok(());
            }
            Ok(RemoteResponse::NotFound) => {
                warn!(file = %self.name, source = %self.locator, "File not found on remote");
                return Ok(());
            }
            Err(e) => {
                warn!(file = %self.name, source = %self.locator, error = %e, "Fetch failed");
                return Ok(());
            }
        };

        if fingerprint == self.current {
            self.mark_same(fingerprint);
            return Ok(());
        }

        let actual = compute_blob_fingerprint(&content);
        if actual != fingerprint {
            warn!(
                file = %self.name,
                expected = %fingerprint,
                actual = %actual,
                "Downloaded content does not match its fingerprint"
            );
            return Ok(());
        }

        self.latest = Some(fingerprint);
        self.state = FileState::FetchedNew;
        self.stage(&content, ctx.validator).await
    }

    fn mark_same(&mut self, fingerprint: String) {
        debug!(file = %self.name, "Remote version matches local");
        self.latest = Some(fingerprint);
        self.state = FileState::FetchedSame;
    }

    /// Write downloaded content beside the live file and validate it
    async fn stage(&mut self, content: &[u8], validator: &dyn Validator) -> Result<(), FileError> {
        let latest_path = self.latest_path();
        if let Some(parent) = latest_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&latest_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);

        if validator.validate(&latest_path).await {
            debug!(file = %self.name, staged = %latest_path.display(), "Staged new version");
            self.staged = Some(latest_path);
            self.state = FileState::StagedValid;
            return Ok(());
        }

        // Keep the rejected download for inspection
        let error_path = self.quarantine_path();
        fs::rename(&latest_path, &error_path).await?;
        self.staged = None;
        self.state = FileState::StagedInvalid;
        Err(FileError::ValidationFailed(self.name.clone()))
    }

    /// Move the staged download over the live file.
    ///
    /// The live name always refers to a complete file: either the old one or
    /// the new one.
    pub async fn promote(&mut self) -> Result<(), FileError> {
        if self.state != FileState::StagedValid {
            return Err(FileError::NotStaged(self.name.clone()));
        }
        let (Some(staged), Some(latest)) = (self.staged.clone(), self.latest.clone()) else {
            return Err(FileError::NotStaged(self.name.clone()));
        };

        let live = self.live_path();
        if self.save_backups && live.exists() {
            let backup = self.backup_path();
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&live, &backup).await?;
        }
        fs::rename(&staged, &live).await?;

        info!(file = %self.name, from = %self.current, to = %latest, "Promoted new version");
        self.current = latest;
        self.staged = None;
        self.state = FileState::Promoted;
        Ok(())
    }
}
