use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Container name used for Azure static website hosting.
pub const DEFAULT_CONTAINER: &str = "$web";
pub const DEFAULT_SOURCE_DIR: &str = "../html";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;

/// Settings for one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Root of the generated site.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Pre-existing target collection. Never created by this tool.
    #[serde(default = "default_container")]
    pub container: String,
    /// Upper bound on in-flight store calls within a phase.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per store call; `0` disables the timeout.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    /// Treat per-file failures as a failed run.
    #[serde(default)]
    pub strict: bool,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE_DIR)
}

fn default_container() -> String {
    DEFAULT_CONTAINER.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT_SECS
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            source_dir: default_source_dir(),
            container: default_container(),
            concurrency: default_concurrency(),
            call_timeout_secs: default_call_timeout_secs(),
            strict: false,
        }
    }
}

impl SyncConfig {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        SyncConfig {
            source_dir: source_dir.into(),
            ..SyncConfig::default()
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout_secs = timeout.map(|t| t.as_secs().max(1)).unwrap_or(0);
        self
    }

    /// Never below one.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs))
    }

    pub fn trace_loaded(&self) {
        info!(
            source_dir = %self.source_dir.display(),
            container = %self.container,
            concurrency = self.effective_concurrency(),
            call_timeout_secs = self.call_timeout_secs,
            strict = self.strict,
            "Loaded SyncConfig"
        );
        debug!(?self, "SyncConfig loaded (full debug)");
    }
}
