//! `load_config` module: Loads a static YAML config file into the core `SyncConfig`.
//!
//! This module is the only place where user-supplied YAML is parsed and mapped to the strongly-typed
//! settings the reconciler runs with. Secrets (storage account, SAS token) are never read from
//! YAML; the store client takes them from the environment.
//!
//! # Responsibilities
//! - Parse the YAML file into [`SyncConfig`], applying defaults for omitted keys
//! - Reject configs that cannot describe a run (empty `source_dir` or `container`)
//! - Produce clear diagnostics: any failure in loading names the file and the cause
//!
//! The existence of `source_dir` is not checked here; the scanner reports that as a
//! fatal run error.
//!
//! # Errors
//! All errors in this module use `anyhow::Error` for context-rich diagnostics, and are surfaced at the CLI boundary.

use anyhow::Result;
use site_sync_core::config::SyncConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Loads a static YAML config file (no secrets) into a [`SyncConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config = parse_config(&config_content)?;
    info!(config_path = ?path_ref, "Parsed config YAML successfully");
    config.trace_loaded();
    Ok(config)
}

/// Parses YAML text into a validated [`SyncConfig`].
pub fn parse_config(yaml: &str) -> Result<SyncConfig> {
    // An empty document means "all defaults".
    let config: SyncConfig = if yaml.trim().is_empty() {
        SyncConfig::default()
    } else {
        match serde_yaml::from_str(yaml) {
            Ok(conf) => conf,
            Err(e) => {
                error!(error = ?e, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    if config.source_dir.as_os_str().is_empty() {
        error!("source_dir is empty in config");
        anyhow::bail!("source_dir must not be empty");
    }
    if config.container.trim().is_empty() {
        error!("container is empty in config");
        anyhow::bail!("container must not be empty");
    }

    Ok(config)
}
