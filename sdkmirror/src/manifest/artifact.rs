//! Resolved artifact descriptors.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

/// One package family at one specific revision, as described by a type node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyRevision {
    /// Identity of the family (tag name, add-on `name-id` or extra `path`).
    pub family_id: String,
    /// Raw tag name of the type node, e.g. `platform` or `add-on`.
    pub kind: String,
    /// Comparable version signal for this revision.
    pub version: Decimal,
    /// Whether the type node carried an `<obsolete>` marker.
    pub obsolete: bool,
}

/// One `<archive>` entry read from a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Declared size in bytes.
    pub size_bytes: u64,
    /// SHA-1 checksum, hex-encoded.
    pub checksum_hex: String,
    /// Path relative to the download host.
    pub relative_url: String,
}

/// A downloadable archive belonging to a package family.
///
/// Immutable once constructed and identified by `(family_id, relative_url)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactDescriptor {
    family_id: String,
    kind: String,
    version: Decimal,
    obsolete: bool,
    size_bytes: u64,
    checksum_hex: String,
    relative_url: String,
}

impl ArtifactDescriptor {
    /// Create a descriptor for `entry`, tagged with its family revision.
    pub fn new(revision: &FamilyRevision, entry: ArchiveEntry) -> Self {
        Self {
            family_id: revision.family_id.clone(),
            kind: revision.kind.clone(),
            version: revision.version,
            obsolete: revision.obsolete,
            size_bytes: entry.size_bytes,
            checksum_hex: entry.checksum_hex,
            relative_url: entry.relative_url,
        }
    }

    pub fn family_id(&self) -> &str {
        &self.family_id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn version(&self) -> Decimal {
        self.version
    }

    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn checksum_hex(&self) -> &str {
        &self.checksum_hex
    }

    pub fn relative_url(&self) -> &str {
        &self.relative_url
    }

    /// Local path of this artifact inside `output_dir`.
    pub fn destination(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.relative_url)
    }
}
