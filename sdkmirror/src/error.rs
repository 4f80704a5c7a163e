//! Error types for mirror operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// Errors that can occur while resolving or mirroring a repository.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// A manifest could not be fetched or its body could not be read.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The normalized manifest could not be parsed into a document tree.
    #[error("failed to parse manifest: {0}")]
    Parse(String),

    /// An artifact transfer failed.
    #[error("failed to download {url}: {reason}")]
    Transfer { url: String, reason: String },

    /// An artifact transfer timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Downloaded content did not match the manifest checksum.
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// The manifest checksum is not a valid SHA-1 hex digest.
    #[error("invalid checksum for {url}: {reason}")]
    InvalidChecksum { url: String, reason: String },

    /// The artifact URL could not be built from the base URL.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Failed to read a file.
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// Invalid path provided.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Not a single artifact produced a usable download request.
    #[error("none of the {total} artifacts produced a valid download request")]
    NoRequests { total: usize },

    /// The static file server failed.
    #[error("failed to serve mirror: {0}")]
    Serve(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = MirrorError::Fetch {
            url: "https://example.com/repository-11.xml".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch https://example.com/repository-11.xml: connection refused"
        );
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = MirrorError::ChecksumMismatch {
            path: PathBuf::from("/mirror/platform-30.zip"),
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        assert!(err.to_string().contains("checksum mismatch"));
        assert!(err.to_string().contains("platform-30.zip"));
        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("def456"));
    }

    #[test]
    fn test_write_error_has_source() {
        use std::error::Error as _;

        let err = MirrorError::Write {
            path: PathBuf::from("/readonly/file"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("failed to write /readonly/file"));
    }
}
