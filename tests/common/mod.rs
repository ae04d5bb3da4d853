#![allow(dead_code)]

use async_trait::async_trait;
use ota_updater::{
    compute_blob_fingerprint, Collaborators, DeviceReset, MemoryBudget, RemoteError,
    RemoteResponse, RemoteSource, SourceLocator, UpdaterOptions, Validator,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const REPO: &str = "octo/pico";

/// Marker that makes `MarkerValidator` reject a file
pub const BROKEN: &str = "SYNTAX ERROR";

/// Helper to create a temporary working directory
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Fingerprint of string content
pub fn fingerprint(content: &str) -> String {
    compute_blob_fingerprint(content.as_bytes())
}

/// In-memory remote repository
#[derive(Default)]
pub struct ScriptedRemote {
    files: Mutex<HashMap<String, Vec<u8>>>,
    malformed: Mutex<HashMap<String, String>>,
    pub requests: AtomicUsize,
    pub downloads: AtomicUsize,
}

impl ScriptedRemote {
    pub fn set(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.as_bytes().to_vec());
    }

    pub fn set_malformed(&self, path: &str, reason: &str) {
        self.malformed
            .lock()
            .unwrap()
            .insert(path.to_string(), reason.to_string());
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for ScriptedRemote {
    async fn fetch(
        &self,
        locator: &SourceLocator,
        known_fingerprint: &str,
    ) -> Result<RemoteResponse, RemoteError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self.malformed.lock().unwrap().get(&locator.path) {
            return Ok(RemoteResponse::Malformed(reason.clone()));
        }

        let files = self.files.lock().unwrap();
        let Some(content) = files.get(&locator.path) else {
            return Ok(RemoteResponse::NotFound);
        };

        let remote_fingerprint = compute_blob_fingerprint(content);
        if remote_fingerprint == known_fingerprint {
            return Ok(RemoteResponse::Unchanged);
        }

        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(RemoteResponse::Updated {
            fingerprint: remote_fingerprint,
            content: content.clone(),
        })
    }
}

/// Rejects files containing [`BROKEN`]
pub struct MarkerValidator;

#[async_trait]
impl Validator for MarkerValidator {
    async fn validate(&self, path: &Path) -> bool {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => !content.contains(BROKEN),
            Err(_) => false,
        }
    }
}

/// Counts resets instead of restarting
#[derive(Default)]
pub struct CountingReset {
    pub resets: AtomicUsize,
}

impl CountingReset {
    pub fn count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl DeviceReset for CountingReset {
    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// Memory probe returning a settable value
pub struct FixedMemory(pub AtomicU64);

impl FixedMemory {
    pub fn plenty() -> Self {
        Self(AtomicU64::new(u64::MAX))
    }

    pub fn set(&self, free: u64) {
        self.0.store(free, Ordering::SeqCst);
    }
}

impl MemoryBudget for FixedMemory {
    fn free_memory(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Mock collaborators with handles kept for assertions
pub struct Harness {
    pub remote: Arc<ScriptedRemote>,
    pub reset: Arc<CountingReset>,
    pub memory: Arc<FixedMemory>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            remote: Arc::new(ScriptedRemote::default()),
            reset: Arc::new(CountingReset::default()),
            memory: Arc::new(FixedMemory::plenty()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            remote: self.remote.clone(),
            validator: Arc::new(MarkerValidator),
            memory: self.memory.clone(),
            reset: self.reset.clone(),
        }
    }
}

/// Options tracking `files` from [`REPO`] in `work_dir`
pub fn options(work_dir: &Path, files: &[&str]) -> UpdaterOptions {
    let mut repositories = BTreeMap::new();
    repositories.insert(
        REPO.to_string(),
        files.iter().map(|f| f.to_string()).collect(),
    );

    UpdaterOptions {
        work_dir: work_dir.to_path_buf(),
        repositories,
        ..Default::default()
    }
}
