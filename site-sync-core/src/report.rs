//! Per-item outcomes of a run and the reporters that present them.
//!
//! A [`Reporter`] only presents: its methods return nothing, so a reporter
//! that fails to write cannot turn into an operation failure or change the
//! outcome of a run.

use serde::Serialize;
use tracing::{error, info};

use crate::contract::{StoreError, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Upload,
    Delete,
}

/// Result of one upload or delete attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    Success {
        operation: Operation,
        name: String,
    },
    Failure {
        operation: Operation,
        name: String,
        cause: StoreError,
    },
}

impl OperationOutcome {
    pub fn from_result(operation: Operation, name: impl Into<String>, result: Result<(), StoreError>) -> Self {
        let name = name.into();
        match result {
            Ok(()) => OperationOutcome::Success { operation, name },
            Err(cause) => OperationOutcome::Failure {
                operation,
                name,
                cause,
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            OperationOutcome::Success { name, .. } | OperationOutcome::Failure { name, .. } => name,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            OperationOutcome::Success { operation, .. }
            | OperationOutcome::Failure { operation, .. } => *operation,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success { .. })
    }

    pub fn cause(&self) -> Option<&StoreError> {
        match self {
            OperationOutcome::Success { .. } => None,
            OperationOutcome::Failure { cause, .. } => Some(cause),
        }
    }

    /// The one-line human description of this outcome.
    pub fn describe(&self) -> String {
        match self {
            OperationOutcome::Success {
                operation: Operation::Upload,
                name,
            } => format!("Uploaded {name}"),
            OperationOutcome::Success {
                operation: Operation::Delete,
                name,
            } => format!("Deleted {name}"),
            OperationOutcome::Failure {
                operation: Operation::Upload,
                name,
                cause,
            } => format!("Error uploading {name}: {cause}"),
            OperationOutcome::Failure {
                operation: Operation::Delete,
                name,
                cause,
            } => format!("Error deleting {name}: {cause}"),
        }
    }
}

/// Rolled-up counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub uploaded: usize,
    pub upload_failures: usize,
    pub deleted: usize,
    pub delete_failures: usize,
}

impl SyncSummary {
    pub fn failures(&self) -> usize {
        self.upload_failures + self.delete_failures
    }
}

/// Everything that happened during one run, in completion order per phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub uploads: Vec<OperationOutcome>,
    pub deletions: Vec<OperationOutcome>,
}

impl SyncReport {
    pub fn summary(&self) -> SyncSummary {
        let count = |outcomes: &[OperationOutcome], ok: bool| {
            outcomes.iter().filter(|o| o.is_success() == ok).count()
        };
        SyncSummary {
            uploaded: count(&self.uploads, true),
            upload_failures: count(&self.uploads, false),
            deleted: count(&self.deletions, true),
            delete_failures: count(&self.deletions, false),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary().failures() > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.uploads
            .iter()
            .chain(self.deletions.iter())
            .filter(|o| !o.is_success())
    }
}

/// Receives outcomes as they complete, plus any fatal error, for presentation.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
pub trait Reporter: Send + Sync {
    fn record(&self, outcome: &OperationOutcome);

    fn fatal(&self, error: &SyncError);

    fn summary(&self, _summary: &SyncSummary) {}
}

/// Reports through `tracing`: successes at `info`, failures at `error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn record(&self, outcome: &OperationOutcome) {
        match outcome {
            OperationOutcome::Success { operation, name } => {
                info!(file = %name, ?operation, "{}", outcome.describe());
            }
            OperationOutcome::Failure {
                operation,
                name,
                cause,
            } => {
                error!(file = %name, ?operation, category = cause.category(), error = %cause, "{}", outcome.describe());
            }
        }
    }

    fn fatal(&self, error: &SyncError) {
        error!(error = %error, "[SYNC][FATAL] Synchronisation aborted");
    }

    fn summary(&self, summary: &SyncSummary) {
        info!(
            uploaded = summary.uploaded,
            upload_failures = summary.upload_failures,
            deleted = summary.deleted,
            delete_failures = summary.delete_failures,
            "[SYNC] Run summary"
        );
    }
}
