//! Log output of the download engine while a progress display is active.
//!
//! Lives in its own test binary because it installs a global subscriber.
//!
//! Run with: `cargo test --test engine_logging`

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

use sdkmirror::download::{BatchReport, DownloadEngine, DownloadProgressSnapshot, FetchRequest};
use sdkmirror::traits::{ProgressObserver, Transfer};
use sdkmirror::{MirrorError, MirrorResult};

// ============================================================================
// Fixtures
// ============================================================================

/// Events at warn or error level.
static LOUD: AtomicUsize = AtomicUsize::new(0);
/// Everything below warn.
static QUIET: AtomicUsize = AtomicUsize::new(0);

/// Subscriber that only counts events by severity.
struct LevelCounter;

impl Subscriber for LevelCounter {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        if *event.metadata().level() <= Level::WARN {
            LOUD.fetch_add(1, Ordering::SeqCst);
        } else {
            QUIET.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

struct Unreachable;

impl Transfer for Unreachable {
    fn transfer(&self, request: &FetchRequest, _on_progress: &dyn Fn(u64)) -> MirrorResult<u64> {
        Err(MirrorError::Transfer {
            url: request.url.clone(),
            reason: "connection refused".to_string(),
        })
    }
}

#[derive(Default)]
struct FinishedCount(usize);

impl ProgressObserver for FinishedCount {
    fn on_tick(&mut self, _snapshot: &DownloadProgressSnapshot, newly_finished: &[usize]) {
        self.0 += newly_finished.len();
    }

    fn on_complete(&mut self, _report: &BatchReport) {}
}

fn requests(n: usize) -> Vec<FetchRequest> {
    (1..=n)
        .map(|i| FetchRequest {
            url: format!("https://example.com/{}.zip", i),
            destination: PathBuf::from(format!("/mirror/{}.zip", i)),
            checksum: vec![0; 20],
            size: 10,
            name: format!("{}.zip", i),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_failed_transfers_reach_observer_not_warn_log() {
    tracing::subscriber::set_global_default(LevelCounter).unwrap();

    let engine = DownloadEngine::new(Arc::new(Unreachable))
        .with_concurrency(2)
        .with_tick_interval(Duration::from_millis(5));
    let mut observer = FinishedCount::default();

    let report = engine.run(requests(3), &mut observer);

    assert_eq!(report.failed.len(), 3);
    assert!(report.failed[0].reason.contains("connection refused"));
    assert_eq!(observer.0, 3);
    assert_eq!(LOUD.load(Ordering::SeqCst), 0);
    assert!(QUIET.load(Ordering::SeqCst) > 0);
}
