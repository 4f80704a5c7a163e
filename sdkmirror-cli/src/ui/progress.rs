//! Redrawing download progress display.
//!
//! Every tick the lines describing active transfers are erased and redrawn
//! in place. Finished transfers get one permanent line each, printed above
//! the active block, so the screen scrolls only when something completes.

use std::io::{self, Write};

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use sdkmirror::download::{BatchReport, DownloadProgressSnapshot, TransferPhase, TransferStatus};
use sdkmirror::traits::ProgressObserver;

/// Progress observer writing to a terminal.
pub struct TerminalProgress<W: Write> {
    out: W,
    /// Active-transfer lines drawn on the previous tick.
    drawn: u16,
}

impl<W: Write> TerminalProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out, drawn: 0 }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn redraw(
        &mut self,
        snapshot: &DownloadProgressSnapshot,
        newly_finished: &[usize],
    ) -> io::Result<()> {
        // MoveUp(0) still moves one row on most terminals.
        if self.drawn > 0 {
            queue!(self.out, MoveUp(self.drawn))?;
        }
        queue!(self.out, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;

        for status in newly_finished.iter().filter_map(|&i| snapshot.transfers.get(i)) {
            writeln!(self.out, "{}", finished_line(status))?;
        }

        let mut drawn: u16 = 0;
        for status in snapshot.active() {
            writeln!(self.out, "{}", active_line(status))?;
            drawn = drawn.saturating_add(1);
        }
        self.drawn = drawn;

        self.out.flush()
    }

    fn finish(&mut self, report: &BatchReport) -> io::Result<()> {
        for rejected in &report.rejected {
            writeln!(self.out, "Skipped {}: {}", rejected.relative_url, rejected.error)?;
        }
        writeln!(self.out, "{}", report.summary_line())?;
        self.out.flush()
    }
}

impl<W: Write> ProgressObserver for TerminalProgress<W> {
    fn on_tick(&mut self, snapshot: &DownloadProgressSnapshot, newly_finished: &[usize]) {
        if let Err(e) = self.redraw(snapshot, newly_finished) {
            tracing::warn!(error = %e, "Failed to draw progress");
        }
    }

    fn on_complete(&mut self, report: &BatchReport) {
        if let Err(e) = self.finish(report) {
            tracing::warn!(error = %e, "Failed to print download summary");
        }
    }
}

fn active_line(status: &TransferStatus) -> String {
    format!(
        "Downloading {} {} / {} bytes ({}%)",
        status.name,
        status.bytes,
        status.total,
        status.percent()
    )
}

fn finished_line(status: &TransferStatus) -> String {
    match status.phase {
        TransferPhase::Failed => format!(
            "Error downloading {}: {}",
            status.url,
            status.error.as_deref().unwrap_or("unknown error")
        ),
        _ => format!(
            "Finished {} {} / {} bytes ({}%)",
            status.name,
            status.bytes,
            status.total,
            status.percent()
        ),
    }
}
