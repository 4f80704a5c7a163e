//! Shared progress state for concurrent downloads.
//!
//! Workers write into a [`ProgressTable`], one record per request, and the
//! reporting loop reads it back as a [`DownloadProgressSnapshot`] on every
//! tick. Each record is written only by the worker that owns the request, so
//! the byte counters are plain atomics and readers may see slightly stale,
//! but never decreasing, values.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use super::request::FetchRequest;

/// Lifecycle of a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransferPhase {
    /// Waiting for a free worker.
    Queued = 0,
    /// Bytes are being transferred.
    Active = 1,
    /// Finished and verified.
    Succeeded = 2,
    /// Finished with an error.
    Failed = 3,
}

impl TransferPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Active,
            2 => Self::Succeeded,
            3 => Self::Failed,
            _ => Self::Queued,
        }
    }

    /// Whether the transfer has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Live state of one request.
#[derive(Debug)]
struct TransferRecord {
    name: String,
    url: String,
    total: u64,
    bytes: AtomicU64,
    phase: AtomicU8,
    error: Mutex<Option<String>>,
}

/// Progress records for every request in a batch.
#[derive(Debug)]
pub struct ProgressTable {
    records: Vec<TransferRecord>,
}

impl ProgressTable {
    /// Create a table with one queued record per request.
    pub fn new(requests: &[FetchRequest]) -> Self {
        let records = requests
            .iter()
            .map(|r| TransferRecord {
                name: r.name.clone(),
                url: r.url.clone(),
                total: r.size,
                bytes: AtomicU64::new(0),
                phase: AtomicU8::new(TransferPhase::Queued as u8),
                error: Mutex::new(None),
            })
            .collect();

        Self { records }
    }

    /// Number of requests tracked.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table tracks no requests.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mark a request as picked up by a worker.
    pub fn mark_started(&self, index: usize) {
        if let Some(record) = self.records.get(index) {
            record
                .phase
                .store(TransferPhase::Active as u8, Ordering::SeqCst);
        }
    }

    /// Record the cumulative bytes transferred for a request.
    pub fn update(&self, index: usize, bytes: u64) {
        if let Some(record) = self.records.get(index) {
            record.bytes.store(bytes, Ordering::SeqCst);
        }
    }

    /// Mark a request as finished and verified.
    pub fn mark_succeeded(&self, index: usize, final_bytes: u64) {
        if let Some(record) = self.records.get(index) {
            record.bytes.store(final_bytes, Ordering::SeqCst);
            record
                .phase
                .store(TransferPhase::Succeeded as u8, Ordering::SeqCst);
        }
    }

    /// Mark a request as failed with the given reason.
    pub fn mark_failed(&self, index: usize, reason: String) {
        if let Some(record) = self.records.get(index) {
            *record.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(reason);
            record
                .phase
                .store(TransferPhase::Failed as u8, Ordering::SeqCst);
        }
    }

    /// Phase of a request.
    pub fn phase(&self, index: usize) -> Option<TransferPhase> {
        self.records
            .get(index)
            .map(|r| TransferPhase::from_u8(r.phase.load(Ordering::SeqCst)))
    }

    /// Sample every record.
    pub fn snapshot(&self) -> DownloadProgressSnapshot {
        let transfers = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                // Phase first: a terminal phase guarantees the final byte
                // count and error are already stored.
                let phase = TransferPhase::from_u8(record.phase.load(Ordering::SeqCst));
                TransferStatus {
                    index,
                    name: record.name.clone(),
                    url: record.url.clone(),
                    bytes: record.bytes.load(Ordering::SeqCst),
                    total: record.total,
                    phase,
                    error: record
                        .error
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .clone(),
                }
            })
            .collect();

        DownloadProgressSnapshot { transfers }
    }
}

/// State of one request at the moment a snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferStatus {
    /// Position of the request in the batch.
    pub index: usize,
    /// Path relative to the output directory.
    pub name: String,
    /// Absolute download URL.
    pub url: String,
    /// Bytes transferred so far.
    pub bytes: u64,
    /// Expected size (0 when unknown).
    pub total: u64,
    pub phase: TransferPhase,
    /// Failure reason, set once the phase is `Failed`.
    pub error: Option<String>,
}

impl TransferStatus {
    /// Completion percentage, 0 when the total is unknown.
    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            (self.bytes.saturating_mul(100) / self.total).min(100)
        }
    }
}

/// Per-tick view of every request in a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadProgressSnapshot {
    pub transfers: Vec<TransferStatus>,
}

impl DownloadProgressSnapshot {
    /// Requests currently transferring.
    pub fn active(&self) -> impl Iterator<Item = &TransferStatus> {
        self.transfers
            .iter()
            .filter(|t| t.phase == TransferPhase::Active)
    }

    /// Total bytes transferred across all requests.
    pub fn total_bytes(&self) -> u64 {
        self.transfers.iter().map(|t| t.bytes).sum()
    }

    /// Number of requests that reached a terminal phase.
    pub fn finished_count(&self) -> usize {
        self.transfers
            .iter()
            .filter(|t| t.phase.is_terminal())
            .count()
    }
}
