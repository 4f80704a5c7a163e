//! Fetch requests derived from resolved artifacts.

use std::path::{Component, Path, PathBuf};

use reqwest::Url;

use crate::error::{MirrorError, MirrorResult};
use crate::manifest::ArtifactDescriptor;

/// Length of a SHA-1 digest in bytes.
const SHA1_LEN: usize = 20;

/// One artifact transfer: where to get it, where to put it, what it must hash to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute download URL.
    pub url: String,
    /// Local destination path.
    pub destination: PathBuf,
    /// Expected SHA-1 digest.
    pub checksum: Vec<u8>,
    /// Size declared by the manifest (0 when unknown).
    pub size: u64,
    /// Path relative to the output directory, used for display.
    pub name: String,
}

impl FetchRequest {
    /// Build a request for `descriptor`.
    ///
    /// The URL is `base_url` followed by the descriptor's relative URL and the
    /// destination is `output_dir` joined with the same relative URL.
    ///
    /// # Errors
    ///
    /// Fails if the checksum is not a hex SHA-1 digest, the relative URL
    /// escapes the output directory, or the joined URL does not parse.
    pub fn from_descriptor(
        descriptor: &ArtifactDescriptor,
        base_url: &str,
        output_dir: &Path,
    ) -> MirrorResult<Self> {
        let relative = descriptor.relative_url();
        let url = format!("{}{}", base_url, relative);

        Url::parse(&url).map_err(|e| MirrorError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let checksum =
            hex::decode(descriptor.checksum_hex()).map_err(|e| MirrorError::InvalidChecksum {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        if checksum.len() != SHA1_LEN {
            return Err(MirrorError::InvalidChecksum {
                url,
                reason: format!("expected {} bytes, got {}", SHA1_LEN, checksum.len()),
            });
        }

        let relative_path = Path::new(relative);
        if !relative_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(MirrorError::InvalidPath(format!(
                "archive path leaves the output directory: {}",
                relative
            )));
        }

        Ok(Self {
            url,
            destination: descriptor.destination(output_dir),
            checksum,
            size: descriptor.size_bytes(),
            name: relative.to_string(),
        })
    }
}

/// An artifact no request could be built for.
#[derive(Debug)]
pub struct RejectedArtifact {
    /// Relative URL of the artifact.
    pub relative_url: String,
    /// Why the request could not be built.
    pub error: MirrorError,
}

/// Requests built for a set of artifacts, plus the ones that failed.
#[derive(Debug, Default)]
pub struct RequestBatch {
    pub requests: Vec<FetchRequest>,
    pub rejected: Vec<RejectedArtifact>,
}

impl RequestBatch {
    /// Build a request for every descriptor, in order.
    pub fn build(descriptors: &[ArtifactDescriptor], base_url: &str, output_dir: &Path) -> Self {
        let mut batch = Self::default();

        for descriptor in descriptors {
            match FetchRequest::from_descriptor(descriptor, base_url, output_dir) {
                Ok(request) => batch.requests.push(request),
                Err(error) => {
                    tracing::warn!(
                        url = descriptor.relative_url(),
                        error = %error,
                        "Cannot build download request"
                    );
                    batch.rejected.push(RejectedArtifact {
                        relative_url: descriptor.relative_url().to_string(),
                        error,
                    });
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ArchiveEntry, FamilyRevision};
    use rust_decimal::Decimal;

    const BASE: &str = "https://dl.google.com/android/repository/";
    const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    fn descriptor(url: &str, checksum: &str) -> ArtifactDescriptor {
        ArtifactDescriptor::new(
            &FamilyRevision {
                family_id: "platform".to_string(),
                kind: "platform".to_string(),
                version: Decimal::from(30),
                obsolete: false,
            },
            ArchiveEntry {
                size_bytes: 4096,
                checksum_hex: checksum.to_string(),
                relative_url: url.to_string(),
            },
        )
    }

    #[test]
    fn test_request_from_descriptor() {
        let request = FetchRequest::from_descriptor(
            &descriptor("platform-30_r03.zip", EMPTY_SHA1),
            BASE,
            Path::new("/mirror"),
        )
        .unwrap();

        assert_eq!(
            request.url,
            "https://dl.google.com/android/repository/platform-30_r03.zip"
        );
        assert_eq!(request.destination, PathBuf::from("/mirror/platform-30_r03.zip"));
        assert_eq!(hex::encode(&request.checksum), EMPTY_SHA1);
        assert_eq!(request.size, 4096);
        assert_eq!(request.name, "platform-30_r03.zip");
    }

    #[test]
    fn test_request_keeps_subdirectories() {
        let request = FetchRequest::from_descriptor(
            &descriptor("sys-img/android/x86-30_r10.zip", EMPTY_SHA1),
            BASE,
            Path::new("/mirror"),
        )
        .unwrap();

        assert_eq!(
            request.destination,
            PathBuf::from("/mirror/sys-img/android/x86-30_r10.zip")
        );
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let result =
            FetchRequest::from_descriptor(&descriptor("a.zip", "not-hex"), BASE, Path::new("."));
        assert!(matches!(result, Err(MirrorError::InvalidChecksum { .. })));

        let result =
            FetchRequest::from_descriptor(&descriptor("a.zip", "abcd"), BASE, Path::new("."));
        assert!(matches!(result, Err(MirrorError::InvalidChecksum { .. })));
    }

    #[test]
    fn test_rejects_escaping_path() {
        let result = FetchRequest::from_descriptor(
            &descriptor("../outside.zip", EMPTY_SHA1),
            BASE,
            Path::new("/mirror"),
        );
        assert!(matches!(result, Err(MirrorError::InvalidPath(_))));
    }

    #[test]
    fn test_rejects_malformed_base() {
        let result =
            FetchRequest::from_descriptor(&descriptor("a.zip", EMPTY_SHA1), "not a url/", Path::new("."));
        assert!(matches!(result, Err(MirrorError::InvalidUrl { .. })));
    }

    #[test]
    fn test_batch_separates_rejected() {
        let descriptors = vec![
            descriptor("a.zip", EMPTY_SHA1),
            descriptor("b.zip", "zz"),
            descriptor("c.zip", EMPTY_SHA1),
        ];

        let batch = RequestBatch::build(&descriptors, BASE, Path::new("/mirror"));

        assert_eq!(batch.requests.len(), 2);
        assert_eq!(batch.requests[0].name, "a.zip");
        assert_eq!(batch.requests[1].name, "c.zip");
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].relative_url, "b.zip");
    }
}
