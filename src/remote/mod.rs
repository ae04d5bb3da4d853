//! Remote sources of tracked file content.

mod github;
mod types;

pub use github::{parse_contents_response, Credentials, GitHubSource, DEFAULT_API_BASE};
pub use types::{RemoteResponse, SourceLocator};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected response status {0}")]
    Status(u16),
}

/// Where the authoritative version of a file lives.
///
/// `known_fingerprint` is the fingerprint of the local copy. A source may
/// answer [`RemoteResponse::Unchanged`] without transferring content when the
/// remote fingerprint matches it.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch(
        &self,
        locator: &SourceLocator,
        known_fingerprint: &str,
    ) -> Result<RemoteResponse, RemoteError>;
}
