use std::fmt;

/// Repository and path of a file on the remote source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocator {
    /// `owner/name` of the repository
    pub repository: String,
    /// Path of the file inside the repository
    pub path: String,
}

impl SourceLocator {
    pub fn new(repository: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.repository, self.path)
    }
}

/// What the remote source reported for a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteResponse {
    /// Remote fingerprint equals the local one; no content was transferred
    Unchanged,
    /// Remote holds a different version
    Updated { fingerprint: String, content: Vec<u8> },
    /// The response could not be understood
    Malformed(String),
    /// The file does not exist on the remote
    NotFound,
}
