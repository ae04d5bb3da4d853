use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fingerprints recorded for a single tracked file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionEntry {
    /// Fingerprint of the file active on the device ("" if absent)
    pub current: String,

    /// Fingerprint most recently seen on the remote source
    pub latest: String,
}

impl VersionEntry {
    pub fn new(current: impl Into<String>, latest: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            latest: latest.into(),
        }
    }
}

/// The whole store document: file name -> fingerprints
pub type VersionMap = BTreeMap<String, VersionEntry>;
