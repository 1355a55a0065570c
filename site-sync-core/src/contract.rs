//! # contract: the object store interface and the error taxonomy of a run
//!
//! This module defines the [`ObjectStore`] trait the reconciler talks to, and
//! the two error enums every other module speaks:
//!
//! - [`StoreError`]: the cause of a single failed store call. Every store
//!   operation returns `Result<_, StoreError>`, so callers pattern-match on
//!   `Service` vs `InvalidArgument` instead of on a vendor SDK's exception
//!   hierarchy.
//! - [`SyncError`]: the fatal errors that abort a whole run before anything
//!   is uploaded or deleted.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so tests can script list/put/delete
//!   responses and assert on which calls were (not) made.
//!
//! ## Adding New Store Backends
//! - Implement [`ObjectStore`] for the backend's client handle.
//! - Map remote rejections to [`StoreError::Service`] with the service's own
//!   error code, and local or request-shape problems to
//!   [`StoreError::InvalidArgument`].

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

/// Why a single store call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreError {
    /// The remote service rejected or could not complete the request.
    #[error("Service Error {code}: {message}")]
    Service { code: String, message: String },

    /// The request could not be formed: unreadable local file, malformed name, etc.
    #[error("Invalid Argument: {message}")]
    InvalidArgument { message: String },
}

impl StoreError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        StoreError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Short category label used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::Service { .. } => "service",
            StoreError::InvalidArgument { .. } => "invalid_argument",
        }
    }
}

/// Errors that abort a run. Nothing is uploaded or deleted once one of these occurs.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("the source directory {} does not exist or is not a directory", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("the source directory {} could not be read: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("listing objects in collection '{collection}' failed: {source}")]
    ListingFailed {
        collection: String,
        #[source]
        source: StoreError,
    },
}

/// Capability set of the remote store: list, put and delete objects in a
/// named, flat collection.
///
/// The collection is expected to exist already; implementations never create it.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Return the names of every object in `collection`, across all pages.
    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError>;

    /// Create or overwrite `name` in `collection` with `body`, tagged with `content_type`.
    async fn put(
        &self,
        collection: &str,
        name: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Remove `name` from `collection`.
    async fn delete(&self, collection: &str, name: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        (**self).list(collection).await
    }

    async fn put(
        &self,
        collection: &str,
        name: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        (**self).put(collection, name, body, content_type).await
    }

    async fn delete(&self, collection: &str, name: &str) -> Result<(), StoreError> {
        (**self).delete(collection, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display_carries_code_and_message() {
        let err = StoreError::service("ServerBusy", "try later");
        assert_eq!(err.to_string(), "Service Error ServerBusy: try later");
        assert_eq!(err.category(), "service");

        let err = StoreError::invalid_argument("bad name");
        assert_eq!(err.to_string(), "Invalid Argument: bad name");
        assert_eq!(err.category(), "invalid_argument");
    }

    #[test]
    fn directory_not_found_names_the_path() {
        let err = SyncError::DirectoryNotFound {
            path: PathBuf::from("/nope/html"),
        };
        assert!(err.to_string().contains("/nope/html"));
    }
}
