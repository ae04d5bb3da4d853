mod hash;

pub use hash::{compute_blob_fingerprint, compute_file_fingerprint};

use std::path::{Path, PathBuf};

/// The name of the version store file
pub const VERSIONS_FILE: &str = "versions.json";

/// Prefix for downloaded content awaiting promotion
pub const LATEST_FILE_PREFIX: &str = "__latest__";

/// Prefix for downloaded content that failed validation
pub const ERROR_FILE_PREFIX: &str = "__error__";

/// Prefix for the previous live copy of a promoted file
pub const BACKUP_FILE_PREFIX: &str = "__backup__";

/// Get the path to the version store in a working directory
pub fn get_versions_path(work_dir: &Path) -> PathBuf {
    work_dir.join(VERSIONS_FILE)
}

/// Path of an artifact derived from a tracked file.
///
/// The prefix goes on the file name component so the artifact stays in the
/// same directory as the live file and renames between them never cross a
/// filesystem boundary.
pub fn prefixed_path(work_dir: &Path, name: &str, prefix: &str) -> PathBuf {
    let live = work_dir.join(name);
    let file_name = live
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    live.with_file_name(format!("{prefix}{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_path_top_level() {
        let path = prefixed_path(Path::new("/flash"), "main.py", LATEST_FILE_PREFIX);
        assert_eq!(path, PathBuf::from("/flash/__latest__main.py"));
    }

    #[test]
    fn test_prefixed_path_nested() {
        let path = prefixed_path(Path::new("/flash"), "lib/net.py", BACKUP_FILE_PREFIX);
        assert_eq!(path, PathBuf::from("/flash/lib/__backup__net.py"));
    }
}
