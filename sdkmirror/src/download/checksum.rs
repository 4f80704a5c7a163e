//! SHA-1 checksum calculation for downloaded archives.
//!
//! The SDK manifests publish SHA-1 digests, so that is what archives are
//! verified against once fully written.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::error::{MirrorError, MirrorResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the SHA-1 digest of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn calculate_file_checksum(path: &Path) -> MirrorResult<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| MirrorError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| MirrorError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_vec())
}

/// Verify that a file matches an expected SHA-1 digest.
pub fn verify_checksum(path: &Path, expected: &[u8]) -> MirrorResult<()> {
    let actual = calculate_file_checksum(path)?;
    if actual != expected {
        return Err(MirrorError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HELLO_WORLD_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";

    #[test]
    fn test_calculate_file_checksum() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"hello world").unwrap();

        let checksum = calculate_file_checksum(&file_path).unwrap();
        assert_eq!(hex::encode(checksum), HELLO_WORLD_SHA1);
    }

    #[test]
    fn test_calculate_empty_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("empty.txt");

        File::create(&file_path).unwrap();

        let checksum = calculate_file_checksum(&file_path).unwrap();

        // SHA-1 of empty input
        assert_eq!(
            hex::encode(checksum),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_calculate_nonexistent_file() {
        let result = calculate_file_checksum(Path::new("/nonexistent/file.txt"));
        assert!(matches!(result, Err(MirrorError::Read { .. })));
    }

    #[test]
    fn test_verify_checksum_match() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        std::fs::write(&file_path, b"hello world").unwrap();

        let expected = hex::decode(HELLO_WORLD_SHA1).unwrap();
        assert!(verify_checksum(&file_path, &expected).is_ok());
    }

    #[test]
    fn test_verify_checksum_mismatch() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");
        std::fs::write(&file_path, b"hello world").unwrap();

        let result = verify_checksum(&file_path, &[0u8; 20]);

        match result {
            Err(MirrorError::ChecksumMismatch {
                path,
                expected,
                actual,
            }) => {
                assert_eq!(path, file_path);
                assert_eq!(expected, "0".repeat(40));
                assert_eq!(actual, HELLO_WORLD_SHA1);
            }
            _ => panic!("Expected ChecksumMismatch error"),
        }
    }

    #[test]
    fn test_large_file_checksum() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("large.bin");

        // Larger than the read buffer
        std::fs::write(&file_path, vec![0xABu8; 100_000]).unwrap();

        let checksum = calculate_file_checksum(&file_path).unwrap();
        let checksum2 = calculate_file_checksum(&file_path).unwrap();
        assert_eq!(checksum, checksum2);
        assert_eq!(checksum.len(), 20);
    }
}
