use sha1::{Digest, Sha1};
use std::path::Path;
use tokio::fs;

/// Compute the git blob SHA-1 of a byte string.
///
/// Hashes `"blob <len>\0"` followed by the content, which is the value GitHub
/// reports as a file's `sha`.
pub fn compute_blob_fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Compute the git blob SHA-1 of a file's contents.
///
/// A file that does not exist has the empty fingerprint.
pub async fn compute_file_fingerprint(path: &Path) -> Result<String, std::io::Error> {
    match fs::read(path).await {
        Ok(content) => Ok(compute_blob_fingerprint(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_fingerprint_matches_git() {
        // `printf 'hello world\n' | git hash-object --stdin`
        assert_eq!(
            compute_blob_fingerprint(b"hello world\n"),
            "3b18e512dba79e4c8300dd08aeb37f8e728b8dad"
        );
    }

    #[test]
    fn test_empty_blob_fingerprint() {
        assert_eq!(
            compute_blob_fingerprint(b""),
            "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
        );
    }

    #[tokio::test]
    async fn test_missing_file_has_empty_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let hash = compute_file_fingerprint(&dir.path().join("absent.py"))
            .await
            .unwrap();
        assert!(hash.is_empty());
    }

    #[tokio::test]
    async fn test_file_fingerprint_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        fs::write(&path, b"print('hi')\n").await.unwrap();

        let first = compute_file_fingerprint(&path).await.unwrap();
        let second = compute_file_fingerprint(&path).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, compute_blob_fingerprint(b"print('hi')\n"));
    }
}
