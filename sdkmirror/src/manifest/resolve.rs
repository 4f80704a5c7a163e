//! Resolution of normalized manifests into the current archive set.
//!
//! Every `<archives>` element hangs off a *type node* (`<platform>`,
//! `<build-tool>`, `<add-on>`, ...) describing one package family at one
//! revision. The resolver reads the family identity and version signal of
//! each type node, remembers the highest version per family, and keeps only
//! the archives of that highest revision.
//!
//! # Version signal
//!
//! `api-level` is used when present and non-zero. Otherwise the version is
//! built from `revision/major`, `revision/minor` and `revision/micro` by
//! [`build_fallback_version`], which joins them as `major "." minor micro`.
//! Minor and micro are concatenated with no separator, so `1`, `2`, `3`
//! becomes `1.23`. Mirrors built by other tools compare versions the same
//! way, so the shape is kept exactly.
//!
//! # Loose markup
//!
//! Descriptions and licenses are free text and sometimes carry a bare `&`
//! or an HTML `<br>`. When strict parsing fails the text is repaired by
//! [`repair_markup`] and parsed once more, so one stray character does not
//! cost the whole manifest.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use roxmltree::{Document, Node};
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use super::artifact::{ArchiveEntry, ArtifactDescriptor, FamilyRevision};
use crate::error::{MirrorError, MirrorResult};

/// Type node kinds whose archives are never mirrored.
pub const EXCLUDED_KINDS: [&str; 2] = ["doc", "sdk-source"];

fn ampersand_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Group 1 is present only for an already valid entity reference
    PATTERN.get_or_init(|| {
        Regex::new(r"&(#[0-9]+;|#x[0-9a-fA-F]+;|[A-Za-z][A-Za-z0-9]*;)?").unwrap()
    })
}

fn free_text_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<description\b[^>]*>.*?</description>|<license\b[^>]*>.*?</license>")
            .unwrap()
    })
}

fn void_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<br\s*>").unwrap())
}

/// Make loosely written markup well-formed.
///
/// Bare ampersands are escaped, description and license elements are
/// dropped (nothing reads them) and stray HTML line breaks are removed.
pub fn repair_markup(text: &str) -> String {
    let text = ampersand_pattern().replace_all(text, |caps: &Captures| match caps.get(1) {
        Some(_) => caps[0].to_string(),
        None => "&amp;".to_string(),
    });
    let text = free_text_pattern().replace_all(&text, "");
    void_tag_pattern().replace_all(&text, "").into_owned()
}

/// Highest version seen for each family during one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct FamilyVersionIndex {
    latest: HashMap<String, Decimal>,
}

impl FamilyVersionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `family_id` exists at `version`.
    pub fn observe(&mut self, family_id: &str, version: Decimal) {
        match self.latest.get_mut(family_id) {
            Some(current) if *current >= version => {}
            Some(current) => *current = version,
            None => {
                self.latest.insert(family_id.to_string(), version);
            }
        }
    }

    /// Highest version recorded for `family_id`.
    pub fn latest(&self, family_id: &str) -> Option<Decimal> {
        self.latest.get(family_id).copied()
    }

    /// Whether `version` is the highest recorded version of `family_id`.
    pub fn is_latest(&self, family_id: &str, version: Decimal) -> bool {
        self.latest(family_id) == Some(version)
    }

    /// Number of families recorded.
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    /// Whether no family has been recorded.
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

/// Build a version from the three revision fields.
///
/// The fields are joined as `major "." minor micro` and parsed as a decimal:
/// `("1", "2", "3")` gives `1.23`. Missing fields are passed as empty strings.
/// Text that does not form a number gives zero.
pub fn build_fallback_version(major: &str, minor: &str, micro: &str) -> Decimal {
    let joined = format!("{}.{}{}", major.trim(), minor.trim(), micro.trim());
    parse_decimal(&joined).unwrap_or(Decimal::ZERO)
}

/// Parse manifest text as a decimal.
///
/// A dangling point is tolerated on either side: `"30."` is 30 and `".5"`
/// is 0.5.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let text = text.strip_suffix('.').unwrap_or(text);
    if text.is_empty() {
        return None;
    }
    if text.starts_with('.') {
        return Decimal::from_str(&format!("0{}", text)).ok();
    }
    Decimal::from_str(text).ok()
}

/// Resolve a normalized manifest into the archives of each family's newest
/// revision, in document order.
///
/// # Errors
///
/// Returns [`MirrorError::Parse`] if the text is not well-formed, even
/// after [`repair_markup`].
pub fn resolve(document: &str) -> MirrorResult<Vec<ArtifactDescriptor>> {
    match Document::parse(document) {
        Ok(doc) => Ok(resolve_document(&doc)),
        Err(strict) => {
            let repaired = repair_markup(document);
            let doc = Document::parse(&repaired)
                .map_err(|_| MirrorError::Parse(strict.to_string()))?;
            tracing::warn!(error = %strict, "Manifest is not well-formed, resolved after repair");
            Ok(resolve_document(&doc))
        }
    }
}

fn resolve_document(doc: &Document) -> Vec<ArtifactDescriptor> {
    let mut index = FamilyVersionIndex::new();
    let mut descriptors = Vec::new();

    for archives in doc.descendants().filter(|n| n.has_tag_name("archives")) {
        let Some(type_node) = archives.parent_element() else {
            continue;
        };

        let revision = family_revision(type_node);
        if EXCLUDED_KINDS.contains(&revision.kind.as_str()) {
            tracing::debug!(kind = %revision.kind, "Skipping non-binary archives");
            continue;
        }

        tracing::debug!(
            family = %revision.family_id,
            version = %revision.version,
            obsolete = revision.obsolete,
            "Found package revision"
        );
        index.observe(&revision.family_id, revision.version);

        for archive in archives.children().filter(|n| n.has_tag_name("archive")) {
            if let Some(entry) = archive_entry(archive) {
                descriptors.push(ArtifactDescriptor::new(&revision, entry));
            }
        }
    }

    let parsed = descriptors.len();
    descriptors.retain(|d| index.is_latest(d.family_id(), d.version()));
    tracing::info!(
        families = index.len(),
        parsed,
        retained = descriptors.len(),
        "Resolved manifest archives"
    );

    descriptors
}

/// Read the family identity and version signal of a type node.
fn family_revision(type_node: Node) -> FamilyRevision {
    let kind = type_node.tag_name().name().to_string();

    let identity_field = match kind.as_str() {
        "add-on" => Some("name-id"),
        "extra" => Some("path"),
        _ => None,
    };
    let family_id = identity_field
        .and_then(|field| descendant_text(type_node, field))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| kind.clone());

    let obsolete = type_node
        .children()
        .any(|n| n.has_tag_name("obsolete"));

    FamilyRevision {
        family_id,
        kind,
        version: version_signal(type_node),
        obsolete,
    }
}

/// `api-level` if present and non-zero, else the revision fallback.
fn version_signal(type_node: Node) -> Decimal {
    let api_level = descendant_text(type_node, "api-level")
        .and_then(parse_decimal)
        .unwrap_or(Decimal::ZERO);
    if !api_level.is_zero() {
        return api_level;
    }

    build_fallback_version(
        revision_part(type_node, "major"),
        revision_part(type_node, "minor"),
        revision_part(type_node, "micro"),
    )
}

/// Text of the first `revision > name` element under `type_node`.
fn revision_part<'a>(type_node: Node<'a, '_>, name: &str) -> &'a str {
    type_node
        .descendants()
        .find(|n| {
            n.has_tag_name(name)
                && n.parent_element()
                    .is_some_and(|p| p.has_tag_name("revision"))
        })
        .and_then(|n| n.text())
        .unwrap_or("")
}

/// Build an archive entry, skipping entries without a URL.
fn archive_entry(archive: Node) -> Option<ArchiveEntry> {
    let Some(relative_url) = child_text(archive, "url").filter(|u| !u.is_empty()) else {
        tracing::warn!("Skipping archive entry without a url");
        return None;
    };

    let size_bytes = match child_text(archive, "size").map(str::parse::<u64>) {
        Some(Ok(size)) => size,
        _ => {
            tracing::warn!(url = relative_url, "Archive has no valid size, recording 0");
            0
        }
    };

    Some(ArchiveEntry {
        size_bytes,
        checksum_hex: child_text(archive, "checksum").unwrap_or("").to_string(),
        relative_url: relative_url.to_string(),
    })
}

/// Trimmed text of the first descendant element named `name`.
fn descendant_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.descendants()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(str::trim)
}

/// Trimmed text of the first child element named `name`.
fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(str::trim)
}
