//! Console presentation of a run: one line per outcome, then a summary line.

use std::io::{self, Write};
use std::sync::Mutex;

use site_sync_core::contract::SyncError;
use site_sync_core::report::{OperationOutcome, Reporter, SyncSummary};

/// Writes human-readable outcome lines to `W`.
///
/// Write failures are logged and dropped; they never affect the run.
pub struct ConsoleReporter<W> {
    out: Mutex<W>,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleReporter::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        ConsoleReporter {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn line(&self, text: &str) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "Failed to write report line");
        }
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn record(&self, outcome: &OperationOutcome) {
        self.line(&outcome.describe());
    }

    fn fatal(&self, error: &SyncError) {
        self.line(&format!("[ERROR] {error}"));
    }

    fn summary(&self, summary: &SyncSummary) {
        self.line(&format!(
            "Synchronise complete: {} uploaded, {} upload failures, {} deleted, {} delete failures.",
            summary.uploaded, summary.upload_failures, summary.deleted, summary.delete_failures
        ));
    }
}
