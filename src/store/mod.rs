//! Persistent record of which version of each tracked file is on the device.
//!
//! The store is a single JSON document mapping file names to their current
//! and latest fingerprints. Every mutation reads the whole document, changes
//! it in memory, and writes the whole document back. There is no append or
//! partial write path.

mod storage;
mod types;

pub use storage::VersionStore;
pub use types::{VersionEntry, VersionMap};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Already an entry for {0} in the version store")]
    DuplicateEntry(String),

    #[error("Version store has not been initialized")]
    Uninitialized,
}
