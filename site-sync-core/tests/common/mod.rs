#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use site_sync_core::contract::{ObjectStore, StoreError, SyncError};
use site_sync_core::report::{OperationOutcome, Reporter, SyncSummary};

/// A stored object: its bytes and content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-memory store that behaves like a real collection and counts its calls.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failing_puts: BTreeSet<String>,
    pub lists: AtomicUsize,
    pub puts: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MemoryStore {
    pub fn with_objects(names: &[&str]) -> Self {
        let store = MemoryStore::default();
        {
            let mut objects = store.objects.lock().unwrap();
            for name in names {
                objects.insert(
                    name.to_string(),
                    StoredObject {
                        body: b"stale".to_vec(),
                        content_type: "application/octet-stream".into(),
                    },
                );
            }
        }
        store
    }

    pub fn failing_put(mut self, name: &str) -> Self {
        self.failing_puts.insert(name.to_string());
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, name: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, _collection: &str) -> Result<Vec<String>, StoreError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.names())
    }

    async fn put(
        &self,
        _collection: &str,
        name: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.failing_puts.contains(name) {
            return Err(StoreError::service("ServerBusy", "The server is busy."));
        }
        self.objects.lock().unwrap().insert(
            name.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, _collection: &str, name: &str) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        match self.objects.lock().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(StoreError::service("BlobNotFound", "The specified blob does not exist.")),
        }
    }
}

/// Keeps every reported outcome, fatal error and summary, in arrival order.
#[derive(Default)]
pub struct CollectingReporter {
    pub outcomes: Mutex<Vec<OperationOutcome>>,
    pub fatals: Mutex<Vec<String>>,
    pub summaries: Mutex<Vec<SyncSummary>>,
}

impl Reporter for CollectingReporter {
    fn record(&self, outcome: &OperationOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }

    fn fatal(&self, error: &SyncError) {
        self.fatals.lock().unwrap().push(error.to_string());
    }

    fn summary(&self, summary: &SyncSummary) {
        self.summaries.lock().unwrap().push(*summary);
    }
}

pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
