//! Seams between the mirror pipeline and its collaborators.
//!
//! Network access, operator interaction and progress rendering all sit
//! behind these traits so the pipeline can be driven by test doubles.

use crate::download::{BatchReport, DownloadProgressSnapshot, FetchRequest};
use crate::error::MirrorResult;
use crate::summary::PendingSummary;

/// Source of raw manifest documents.
pub trait ManifestSource: Send + Sync {
    /// Fetch the manifest at `url` and return its body as text.
    fn fetch(&self, url: &str) -> MirrorResult<String>;
}

/// Moves one artifact from its URL to its destination.
pub trait Transfer: Send + Sync {
    /// Download `request` to its destination and verify its checksum.
    ///
    /// `on_progress` receives the cumulative byte count as data arrives.
    /// Returns the number of bytes written.
    fn transfer(&self, request: &FetchRequest, on_progress: &dyn Fn(u64)) -> MirrorResult<u64>;
}

/// Asks the operator whether a download should go ahead.
pub trait Confirmer {
    /// Returns true when the operator approves downloading `summary`.
    fn confirm(&self, summary: &PendingSummary) -> bool;
}

/// Receives periodic progress samples from the download engine.
pub trait ProgressObserver {
    /// Called once per tick.
    ///
    /// `newly_finished` holds indices into `snapshot.transfers` for requests
    /// that reached a terminal state since the previous tick. Each index is
    /// reported exactly once over the lifetime of a batch.
    fn on_tick(&mut self, snapshot: &DownloadProgressSnapshot, newly_finished: &[usize]);

    /// Called once after every request has reached a terminal state.
    fn on_complete(&mut self, _report: &BatchReport) {}
}
