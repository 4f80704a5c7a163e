//! sdkmirror - offline mirrors of Android SDK repositories
//!
//! This library fetches the machine-generated repository manifests, works out
//! which archives are current for every package family, and downloads those
//! archives with SHA-1 verification and live progress reporting.
//!
//! # Pipeline
//!
//! ```text
//! ManifestSource ──► normalize ──► resolve ──► PendingSummary ──► DownloadEngine
//!  (fetch + copy)    (lexical)     (latest      (confirm gate)     (worker pool +
//!                                   per family)                     progress table)
//! ```
//!
//! [`mirror::Mirror`] wires the stages together. Each stage is also usable on
//! its own, which is how the CLI's `list` command resolves manifests without
//! downloading anything.

pub mod config;
pub mod download;
pub mod error;
pub mod manifest;
pub mod mirror;
pub mod serve;
pub mod summary;
pub mod traits;

pub use config::MirrorConfig;
pub use error::{MirrorError, MirrorResult};
