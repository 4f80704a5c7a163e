//! Bounded-parallelism download engine.
//!
//! All requests are queued up front. A fixed pool of worker threads drains
//! the queue, each running one blocking transfer to completion before taking
//! the next. The calling thread runs the reporting loop: it waits for either a
//! "transfer started" notification or the next tick, samples the
//! [`ProgressTable`] on every tick and hands the snapshot to a
//! [`ProgressObserver`]. The loop ends once every request has succeeded or
//! failed. A failed transfer never stops its siblings.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use super::progress::{ProgressTable, TransferPhase};
use super::request::{FetchRequest, RejectedArtifact};
use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_TICK_INTERVAL};
use crate::traits::{ProgressObserver, Transfer};

/// A transfer that finished and verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub name: String,
    pub url: String,
    pub bytes: u64,
}

/// A transfer that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// Result of a download batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Transfers that completed and passed verification.
    pub succeeded: Vec<TransferOutcome>,
    /// Transfers that failed.
    pub failed: Vec<TransferFailure>,
    /// Artifacts no request could be built for.
    pub rejected: Vec<RejectedArtifact>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Failed transfers plus rejected artifacts.
    pub fn failure_count(&self) -> usize {
        self.failed.len() + self.rejected.len()
    }

    /// Bytes written by successful transfers.
    pub fn bytes_downloaded(&self) -> u64 {
        self.succeeded.iter().map(|s| s.bytes).sum()
    }

    /// Final tally shown to the operator.
    pub fn summary_line(&self) -> String {
        format!("{} files successfully downloaded.", self.success_count())
    }
}

/// Observer that discards every progress sample.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_tick(&mut self, _snapshot: &super::DownloadProgressSnapshot, _newly_finished: &[usize]) {}
}

/// Runs fetch requests on a fixed-size worker pool.
pub struct DownloadEngine {
    transfer: Arc<dyn Transfer>,
    concurrency: usize,
    tick_interval: Duration,
}

impl std::fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("concurrency", &self.concurrency)
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}

impl DownloadEngine {
    /// Create an engine with default concurrency and tick interval.
    pub fn new(transfer: Arc<dyn Transfer>) -> Self {
        Self {
            transfer,
            concurrency: DEFAULT_CONCURRENCY,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Set the number of workers (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the reporting interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Download every request and return the outcome of each.
    ///
    /// Blocks until all requests reached a terminal state.
    pub fn run(
        &self,
        requests: Vec<FetchRequest>,
        observer: &mut dyn ProgressObserver,
    ) -> BatchReport {
        let total = requests.len();
        let requests = Arc::new(requests);
        let table = Arc::new(ProgressTable::new(&requests));

        let (queue_tx, queue_rx) = mpsc::channel();
        for index in 0..total {
            queue_tx.send(index).ok();
        }
        drop(queue_tx);
        let queue = Arc::new(Mutex::new(queue_rx));

        let (started_tx, started_rx) = mpsc::channel();
        let workers: Vec<_> = (0..self.concurrency.min(total))
            .map(|_| {
                let queue = Arc::clone(&queue);
                let requests = Arc::clone(&requests);
                let table = Arc::clone(&table);
                let transfer = Arc::clone(&self.transfer);
                let started_tx = started_tx.clone();

                thread::spawn(move || {
                    run_worker(&queue, &requests, &table, transfer.as_ref(), &started_tx);
                })
            })
            .collect();
        drop(started_tx);

        tracing::info!(
            requests = total,
            workers = workers.len(),
            "Starting downloads"
        );

        self.report_until_complete(&table, &started_rx, observer);

        for handle in workers {
            if handle.join().is_err() {
                tracing::error!("Download worker panicked");
            }
        }

        let report = build_report(&table);
        tracing::info!(
            succeeded = report.success_count(),
            failed = report.failed.len(),
            bytes = report.bytes_downloaded(),
            "Downloads finished"
        );
        observer.on_complete(&report);
        report
    }

    /// Tick until every request in `table` has been reported as finished.
    fn report_until_complete(
        &self,
        table: &ProgressTable,
        started: &Receiver<usize>,
        observer: &mut dyn ProgressObserver,
    ) {
        let total = table.len();
        let mut reported = vec![false; total];
        let mut completed = 0;
        let mut workers_gone = false;
        let mut next_tick = Instant::now() + self.tick_interval;

        while completed < total {
            let wait = next_tick.saturating_duration_since(Instant::now());
            if workers_gone {
                thread::sleep(wait);
            } else {
                match started.recv_timeout(wait) {
                    Ok(index) => {
                        tracing::trace!(index, "Transfer started");
                        continue;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        workers_gone = true;
                        continue;
                    }
                }
            }
            next_tick = Instant::now() + self.tick_interval;

            let snapshot = table.snapshot();
            let newly_finished: Vec<usize> = snapshot
                .transfers
                .iter()
                .filter(|t| t.phase.is_terminal() && !reported[t.index])
                .map(|t| t.index)
                .collect();

            for &index in &newly_finished {
                reported[index] = true;
            }
            completed += newly_finished.len();

            observer.on_tick(&snapshot, &newly_finished);
        }
    }
}

/// Take requests off the queue until it is empty.
fn run_worker(
    queue: &Mutex<Receiver<usize>>,
    requests: &[FetchRequest],
    table: &ProgressTable,
    transfer: &dyn Transfer,
    started: &Sender<usize>,
) {
    loop {
        let next = queue.lock().unwrap_or_else(PoisonError::into_inner).recv();
        let Ok(index) = next else {
            break;
        };
        let request = &requests[index];

        table.mark_started(index);
        started.send(index).ok();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            transfer.transfer(request, &|bytes| table.update(index, bytes))
        }));

        match result {
            Ok(Ok(bytes)) => {
                tracing::debug!(url = %request.url, bytes, "Download complete");
                table.mark_succeeded(index, bytes);
            }
            Ok(Err(e)) => {
                // Shown by the observer, not the log, while progress is drawn
                tracing::debug!(url = %request.url, error = %e, "Download failed");
                table.mark_failed(index, e.to_string());
            }
            Err(_) => {
                tracing::error!(url = %request.url, "Download panicked");
                table.mark_failed(index, "transfer panicked".to_string());
            }
        }
    }
}

fn build_report(table: &ProgressTable) -> BatchReport {
    let mut report = BatchReport::default();

    for status in table.snapshot().transfers {
        match status.phase {
            TransferPhase::Succeeded => report.succeeded.push(TransferOutcome {
                name: status.name,
                url: status.url,
                bytes: status.bytes,
            }),
            TransferPhase::Failed => report.failed.push(TransferFailure {
                name: status.name,
                url: status.url,
                reason: status.error.unwrap_or_default(),
            }),
            TransferPhase::Queued | TransferPhase::Active => {}
        }
    }

    report
}
