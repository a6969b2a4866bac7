//! Progress callbacks for a running scan.
//!
//! Callbacks fire from worker threads in completion order, so `index` counts
//! finished symbols rather than universe position.

use tracing::info;

use crate::runner::{ScanReport, SymbolOutcome};

pub trait ScanProgress: Send + Sync {
    /// Called once per symbol as it finishes (`index` is 0-based).
    fn on_symbol_done(&self, index: usize, total: usize, outcome: &SymbolOutcome);

    /// Called when the whole batch is done.
    fn on_batch_complete(&self, report: &ScanReport);
}

/// Discards all progress.
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn on_symbol_done(&self, _index: usize, _total: usize, _outcome: &SymbolOutcome) {}

    fn on_batch_complete(&self, _report: &ScanReport) {}
}

/// Logs a progress line every `every` symbols and a summary at the end.
pub struct LogProgress {
    every: usize,
}

impl LogProgress {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(50)
    }
}

impl ScanProgress for LogProgress {
    fn on_symbol_done(&self, index: usize, total: usize, outcome: &SymbolOutcome) {
        let done = index + 1;
        if done % self.every == 0 || done == total {
            info!(
                done,
                total,
                last = %outcome.symbol(),
                pct = %format!("{:.1}", done as f64 * 100.0 / total.max(1) as f64),
                "scan progress"
            );
        }
    }

    fn on_batch_complete(&self, report: &ScanReport) {
        info!(
            scanned = report.scans.len(),
            skipped = report.skips.len(),
            signals = report.signals().len(),
            elapsed_ms = report.elapsed_ms,
            dataset_hash = %report.dataset_hash,
            "scan complete"
        );
        for (reason, count) in report.skip_counts() {
            if count > 0 {
                info!(%reason, count, "skipped symbols");
            }
        }
    }
}
