//! Pre-flight summary and operator confirmation.
//!
//! Before any archive is downloaded the operator sees how much data is still
//! missing locally and gets a chance to back out. A destination file that
//! already exists counts as present; partial files are not detected.

use std::path::Path;

use crate::config::format_size;
use crate::manifest::ArtifactDescriptor;
use crate::traits::Confirmer;

/// What a mirror run still has to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingSummary {
    /// Number of resolved artifacts.
    pub total: usize,
    /// Artifacts whose destination file does not exist yet.
    pub pending_count: usize,
    /// Declared size of the pending artifacts.
    pub pending_bytes: u64,
}

impl PendingSummary {
    /// Compare `artifacts` against the files present in `output_dir`.
    pub fn compute(artifacts: &[ArtifactDescriptor], output_dir: &Path) -> Self {
        let mut summary = Self {
            total: artifacts.len(),
            ..Self::default()
        };

        for artifact in artifacts {
            if !artifact.destination(output_dir).exists() {
                summary.pending_count += 1;
                summary.pending_bytes += artifact.size_bytes();
            }
        }

        summary
    }

    /// Whether every artifact is already present.
    pub fn is_up_to_date(&self) -> bool {
        self.pending_count == 0
    }

    /// One-line description for prompts and logs.
    pub fn describe(&self) -> String {
        format!(
            "{} of {} files missing locally ({} to download)",
            self.pending_count,
            self.total,
            format_size(self.pending_bytes)
        )
    }
}

/// Decide whether the download may proceed.
///
/// Silent runs always proceed; otherwise the operator is asked.
pub fn confirm_download(summary: &PendingSummary, silent: bool, confirmer: &dyn Confirmer) -> bool {
    if silent {
        tracing::debug!("Silent mode, skipping confirmation");
        return true;
    }
    confirmer.confirm(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ArchiveEntry, FamilyRevision};
    use rust_decimal::Decimal;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    struct Answer {
        value: bool,
        asked: Cell<bool>,
    }

    impl Confirmer for Answer {
        fn confirm(&self, _summary: &PendingSummary) -> bool {
            self.asked.set(true);
            self.value
        }
    }

    fn artifact(url: &str, size: u64) -> ArtifactDescriptor {
        ArtifactDescriptor::new(
            &FamilyRevision {
                family_id: url.to_string(),
                kind: "extra".to_string(),
                version: Decimal::ONE,
                obsolete: false,
            },
            ArchiveEntry {
                size_bytes: size,
                checksum_hex: String::new(),
                relative_url: url.to_string(),
            },
        )
    }

    #[test]
    fn test_compute_skips_existing_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("extras")).unwrap();
        fs::write(temp.path().join("extras/present.zip"), b"x").unwrap();

        let artifacts = vec![
            artifact("extras/present.zip", 100),
            artifact("missing-a.zip", 2048),
            artifact("missing-b.zip", 1024),
        ];

        let summary = PendingSummary::compute(&artifacts, temp.path());

        assert_eq!(summary.total, 3);
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.pending_bytes, 3072);
        assert!(!summary.is_up_to_date());
        assert_eq!(
            summary.describe(),
            "2 of 3 files missing locally (3.0 KB to download)"
        );
    }

    #[test]
    fn test_compute_empty() {
        let summary = PendingSummary::compute(&[], Path::new("/nonexistent"));
        assert_eq!(summary, PendingSummary::default());
        assert!(summary.is_up_to_date());
    }

    #[test]
    fn test_silent_skips_prompt() {
        let answer = Answer {
            value: false,
            asked: Cell::new(false),
        };
        assert!(confirm_download(&PendingSummary::default(), true, &answer));
        assert!(!answer.asked.get());
    }

    #[test]
    fn test_operator_decides() {
        let yes = Answer {
            value: true,
            asked: Cell::new(false),
        };
        let no = Answer {
            value: false,
            asked: Cell::new(false),
        };

        assert!(confirm_download(&PendingSummary::default(), false, &yes));
        assert!(!confirm_download(&PendingSummary::default(), false, &no));
        assert!(yes.asked.get());
        assert!(no.asked.get());
    }
}
