//! High-level pipeline: reconciles the local site directory with the remote collection.
//!
//! A run has three ordered phases:
//!   - Discover: scan the local root into a file set, then list the remote
//!     collection. Either failing is fatal and nothing is mutated.
//!   - Upload: every local file is put with its content type, whether or not
//!     the remote copy already matches.
//!   - Cleanup: every remote name missing from the local set (as scanned in
//!     the discover phase) is deleted.
//!
//! # Error Handling
//! Fatal errors ([`SyncError`]) are reported once and returned. Per-item
//! failures become [`OperationOutcome::Failure`] entries; the run carries on
//! with the next item and nothing is retried. A failed upload still counts as
//! "should exist", so its remote counterpart is never deleted in that run.
//!
//! # Concurrency
//! Within a phase, items run through a bounded pool of
//! `config.concurrency` in-flight store calls. The cleanup phase starts only
//! after every upload attempt has completed and been recorded.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

use crate::config::SyncConfig;
use crate::content_type::content_type_for_path;
use crate::contract::{ObjectStore, StoreError, SyncError};
use crate::report::{Operation, OperationOutcome, Reporter, SyncReport};
use crate::scan::{scan_tree, FilePath};

/// Remote names with no matching local path: `remote − local`.
pub fn orphans(remote: &BTreeSet<String>, local: &BTreeSet<FilePath>) -> Vec<String> {
    remote
        .iter()
        .filter(|name| !local.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Drives a run against an injected store handle.
pub struct Reconciler<S> {
    store: S,
    config: SyncConfig,
}

impl<S: ObjectStore> Reconciler<S> {
    pub fn new(store: S, config: SyncConfig) -> Self {
        Reconciler { store, config }
    }

    /// Names currently in the target collection, sorted. Does not mutate anything.
    pub async fn list_objects(&self) -> Result<Vec<String>, SyncError> {
        Ok(self.discover_remote().await?.into_iter().collect())
    }

    /// Run the full reconciliation, reporting each outcome as it completes.
    pub async fn synchronise<R>(&self, reporter: &R) -> Result<SyncReport, SyncError>
    where
        R: Reporter + ?Sized,
    {
        info!(
            source_dir = %self.config.source_dir.display(),
            container = %self.config.container,
            "[SYNC] Starting synchronisation"
        );

        let local = match self.discover_local() {
            Ok(local) => local,
            Err(e) => {
                reporter.fatal(&e);
                return Err(e);
            }
        };
        info!(
            count = local.len(),
            source_dir = %self.config.source_dir.display(),
            "[SYNC] Going to synchronise files"
        );

        let remote = match self.discover_remote().await {
            Ok(remote) => remote,
            Err(e) => {
                reporter.fatal(&e);
                return Err(e);
            }
        };
        info!(count = remote.len(), "[SYNC] Listed remote objects");

        let uploads = self.upload_all(&local, reporter).await;

        let orphaned = orphans(&remote, &local);
        info!(count = orphaned.len(), "[SYNC][CLEANUP] Orphaned objects to delete");
        let deletions = self.delete_all(orphaned, reporter).await;

        let report = SyncReport { uploads, deletions };
        let summary = report.summary();
        reporter.summary(&summary);
        info!(
            uploaded = summary.uploaded,
            failures = summary.failures(),
            deleted = summary.deleted,
            "[SYNC] Synchronisation complete"
        );
        match serde_json::to_string(&summary) {
            Ok(json) => debug!(json = %json, "[SYNC][DEBUG] Summary as JSON"),
            Err(e) => error!(error = ?e, "[SYNC][DEBUG] Failed to serialize summary as JSON"),
        }

        Ok(report)
    }

    fn discover_local(&self) -> Result<BTreeSet<FilePath>, SyncError> {
        scan_tree(&self.config.source_dir)?.collect()
    }

    async fn discover_remote(&self) -> Result<BTreeSet<String>, SyncError> {
        let container = &self.config.container;
        match self.bounded("list", self.store.list(container)).await {
            Ok(names) => Ok(names.into_iter().collect()),
            Err(source) => {
                error!(container = %container, error = %source, "[SYNC][ERROR] Listing remote objects failed");
                Err(SyncError::ListingFailed {
                    collection: container.clone(),
                    source,
                })
            }
        }
    }

    async fn upload_all<R>(&self, local: &BTreeSet<FilePath>, reporter: &R) -> Vec<OperationOutcome>
    where
        R: Reporter + ?Sized,
    {
        let root = self.config.source_dir.as_path();
        stream::iter(local.iter())
            .map(|path| self.upload_one(root, path))
            .buffer_unordered(self.config.effective_concurrency())
            .inspect(|outcome| reporter.record(outcome))
            .collect()
            .await
    }

    async fn upload_one(&self, root: &Path, path: &FilePath) -> OperationOutcome {
        let content_type = content_type_for_path(path.as_str());
        let local_path = path.to_local_path(root);

        let result = match tokio::fs::read(&local_path).await {
            Ok(body) => {
                debug!(file = %path, content_type = %content_type, size = body.len(), "[SYNC][UPLOAD] Uploading file");
                self.bounded(
                    "put",
                    self.store
                        .put(&self.config.container, path.as_str(), body, &content_type),
                )
                .await
            }
            Err(e) => {
                error!(file = %path, error = ?e, "[SYNC][UPLOAD] Failed to read local file");
                Err(StoreError::invalid_argument(format!(
                    "unable to read {}: {e}",
                    local_path.display()
                )))
            }
        };

        OperationOutcome::from_result(Operation::Upload, path.as_str(), result)
    }

    async fn delete_all<R>(&self, orphaned: Vec<String>, reporter: &R) -> Vec<OperationOutcome>
    where
        R: Reporter + ?Sized,
    {
        stream::iter(orphaned)
            .map(|name| async move {
                debug!(file = %name, "[SYNC][CLEANUP] Deleting orphan");
                let result = self
                    .bounded("delete", self.store.delete(&self.config.container, &name))
                    .await;
                OperationOutcome::from_result(Operation::Delete, name, result)
            })
            .buffer_unordered(self.config.effective_concurrency())
            .inspect(|outcome| reporter.record(outcome))
            .collect()
            .await
    }

    /// Applies the configured per-call timeout to a store call.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.config.call_timeout() {
            Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
                Err(StoreError::service(
                    "OperationTimedOut",
                    format!("{operation} did not complete within {}s", limit.as_secs()),
                ))
            }),
            None => fut.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn remote(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn local(names: &[&str]) -> BTreeSet<FilePath> {
        names.iter().map(|n| FilePath::from(*n)).collect()
    }

    #[test]
    fn orphans_of_overlapping_sets() {
        let result = orphans(
            &remote(&["index.html", "old.html", "css/old.css"]),
            &local(&["index.html", "css/site.css"]),
        );
        assert_eq!(result, vec!["css/old.css", "old.html"]);
    }

    #[test]
    fn orphans_of_disjoint_sets_is_all_remote() {
        let result = orphans(&remote(&["a", "b"]), &local(&["c"]));
        assert_eq!(result, vec!["a", "b"]);
    }

    #[test]
    fn orphans_of_identical_sets_is_empty() {
        let result = orphans(&remote(&["a", "b/c"]), &local(&["a", "b/c"]));
        assert!(result.is_empty());
    }

    #[test]
    fn orphans_match_names_exactly() {
        let result = orphans(&remote(&["Index.html", "index.html "]), &local(&["index.html"]));
        assert_eq!(result, vec!["Index.html", "index.html "]);
    }

    proptest! {
        #[test]
        fn orphans_equal_set_difference(
            r in proptest::collection::btree_set("[a-c]{1,3}", 0..12),
            l in proptest::collection::btree_set("[a-c]{1,3}", 0..12),
        ) {
            let local: BTreeSet<FilePath> = l.iter().map(|n| FilePath::from(n.as_str())).collect();
            let expected: Vec<String> = r.difference(&l).cloned().collect();
            prop_assert_eq!(orphans(&r, &local), expected);
        }
    }
}
