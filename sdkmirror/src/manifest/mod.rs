//! Manifest retrieval and resolution.
//!
//! This module turns a repository manifest URL into the list of archives
//! worth mirroring:
//! - Fetching the document and saving a verbatim copy (`fetch`)
//! - Lexical clean-up of vendor markup (`normalize`)
//! - Picking the newest revision of every package family (`resolve`)
//!
//! # Example
//!
//! ```ignore
//! use sdkmirror::manifest::{normalize, resolve, ManifestFetcher};
//! use sdkmirror::traits::ManifestSource;
//!
//! let fetcher = ManifestFetcher::new()?;
//! let raw = fetcher.fetch("https://dl.google.com/android/repository/repository-11.xml")?;
//! for artifact in resolve(&normalize(&raw))? {
//!     println!("{} {}", artifact.family_id(), artifact.relative_url());
//! }
//! ```

mod artifact;
mod fetch;
mod normalize;
mod resolve;

pub use artifact::{ArchiveEntry, ArtifactDescriptor, FamilyRevision};
pub use fetch::{manifest_file_name, write_manifest_copy, ManifestFetcher};
pub use normalize::normalize;
pub use resolve::{
    build_fallback_version, repair_markup, resolve, FamilyVersionIndex, EXCLUDED_KINDS,
};
