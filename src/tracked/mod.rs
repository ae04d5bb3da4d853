//! Per-file version tracking and the fetch / validate / promote protocol.

mod file;
mod types;

pub use file::{FetchContext, TrackedFile};
pub use types::FileState;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Insufficient memory to continue: {free} bytes free, {floor} required")]
    InsufficientMemory { free: u64, floor: u64 },

    #[error("New {0} will not validate")]
    ValidationFailed(String),

    #[error("No validated download of {0} is staged")]
    NotStaged(String),
}
