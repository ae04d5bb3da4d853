//! Orchestrates reconciliation passes over every tracked file.
//!
//! # Overview
//!
//! - `UpdateOrchestrator::new` builds one `TrackedFile` per configured file and
//!   registers each in the version store
//! - `check` decides whether a pass is due, runs it, and restarts the device
//!   when anything was promoted
//! - Per-file fetch failures are logged and never abort the pass
//!
//! # Usage
//!
//! ```ignore
//! let mut updater =
//!     UpdateOrchestrator::with_github(credentials, DEFAULT_API_BASE, options, validator).await?;
//! updater.check(false).await?;
//! ```

mod orchestrator;
mod types;

pub use orchestrator::{UpdateOrchestrator, RESET_DELAY};
pub use types::{Collaborators, UpdaterOptions};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdaterError {
    #[error("Store error: {0}")]
    StoreError(#[from] crate::store::StoreError),

    #[error("File error: {0}")]
    FileError(#[from] crate::tracked::FileError),

    #[error("{0} is tracked more than once")]
    DuplicateFile(String),
}
