//! Verified concurrent download of resolved archives.
//!
//! This module provides:
//! - Per-artifact fetch requests built from descriptors (`request`)
//! - SHA-1 checksum verification (`checksum`)
//! - Streaming HTTP transfers (`http`)
//! - Shared per-request progress state (`progress`)
//! - The worker pool and reporting loop (`engine`)
//!
//! # Architecture
//!
//! ```text
//! DownloadEngine
//!         │
//!         ├── worker pool ──► Transfer (trait)
//!         │                       └── HttpTransfer
//!         │
//!         ├── ProgressTable (one record per FetchRequest)
//!         │
//!         └── reporting loop ──► ProgressObserver (trait)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sdkmirror::download::{DownloadEngine, HttpTransfer, NoProgress, RequestBatch};
//!
//! let batch = RequestBatch::build(&artifacts, base_url, &output_dir);
//! let engine = DownloadEngine::new(Arc::new(HttpTransfer::new()?)).with_concurrency(2);
//! let report = engine.run(batch.requests, &mut NoProgress);
//! println!("{}", report.summary_line());
//! ```

mod checksum;
mod engine;
mod http;
mod progress;
mod request;

pub use checksum::{calculate_file_checksum, verify_checksum};
pub use engine::{BatchReport, DownloadEngine, NoProgress, TransferFailure, TransferOutcome};
pub use http::HttpTransfer;
pub use progress::{DownloadProgressSnapshot, ProgressTable, TransferPhase, TransferStatus};
pub use request::{FetchRequest, RejectedArtifact, RequestBatch};
