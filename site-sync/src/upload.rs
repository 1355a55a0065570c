#![doc = "Object store integration for the CLI: implements the core `ObjectStore` trait on the Azure Blob Storage SDK."]
//
//! # Azure Blob client (CLI <-> Core)
//!
//! This module wires the [`ObjectStore`] trait from `site-sync-core` to a real
//! Azure storage account through `azure_storage_blobs`, and provides the
//! [`AzureBlobClient`] used by the CLI.
//!
//! ## Client Usage
//!
//! - Construct [`AzureBlobClient`] with [`AzureBlobClient::new_from_env`]
//!   (`AZURE_STORAGE_ACCOUNT`, `AZURE_STORAGE_SAS_TOKEN`, optional
//!   `AZURE_STORAGE_ENDPOINT`) or [`AzureBlobClient::new`].
//! - Authentication is a SAS token; it must grant list, write and delete on
//!   the target container.
//! - Every failure is mapped to a [`StoreError`]: rejections from the service
//!   carry its error code, transport failures become `TransportError`, and
//!   names the service would resolve to a different blob are refused as
//!   `InvalidArgument` before any request is sent.

use std::env;

use async_trait::async_trait;
use azure_core::error::{Error as AzureError, ErrorKind};
use azure_core::{RetryOptions, Url};
use azure_storage::{CloudLocation, StorageCredentials};
use azure_storage_blobs::prelude::{BlobServiceClient, ClientBuilder};
use futures::StreamExt;

use site_sync_core::contract::{ObjectStore, StoreError};

/// Longest blob name the service accepts.
const MAX_BLOB_NAME_LEN: usize = 1024;

pub struct AzureBlobClient {
    service: BlobServiceClient,
}

impl AzureBlobClient {
    /// `endpoint` overrides the public blob endpoint of `account`, e.g.
    /// `http://127.0.0.1:10000/devstoreaccount1` for Azurite.
    pub fn new(
        account: &str,
        endpoint: Option<&str>,
        sas_token: &str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let credentials = StorageCredentials::sas_token(sas_token.trim().trim_start_matches('?'))
            .map_err(|e| {
                tracing::error!(error = %e, "Invalid SAS token");
                e
            })?;

        let location = match endpoint {
            Some(uri) => {
                let parsed = Url::parse(uri).map_err(|e| {
                    tracing::error!(error = ?e, endpoint = uri, "Invalid blob endpoint URL");
                    e
                })?;
                if parsed.cannot_be_a_base() {
                    return Err(format!("blob endpoint {uri} cannot carry a path").into());
                }
                CloudLocation::Custom {
                    account: account.to_string(),
                    uri: uri.trim_end_matches('/').to_string(),
                }
            }
            None => CloudLocation::Public {
                account: account.to_string(),
            },
        };

        // Failed calls are reported, never retried.
        let service = ClientBuilder::with_location(location, credentials)
            .retry(RetryOptions::none())
            .blob_service_client();

        Ok(AzureBlobClient { service })
    }

    pub fn new_from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let account = env::var("AZURE_STORAGE_ACCOUNT").map_err(|e| {
            tracing::error!(error = ?e, "AZURE_STORAGE_ACCOUNT missing in environment");
            e
        })?;
        let sas_token = env::var("AZURE_STORAGE_SAS_TOKEN").map_err(|e| {
            tracing::error!(error = ?e, "AZURE_STORAGE_SAS_TOKEN missing in environment");
            e
        })?;
        let endpoint = env::var("AZURE_STORAGE_ENDPOINT").ok().filter(|e| !e.trim().is_empty());

        tracing::info!(
            account = %account,
            endpoint = endpoint.as_deref().unwrap_or("public"),
            sas_token_set = !sas_token.is_empty(),
            "Initialized AzureBlobClient from environment"
        );
        Self::new(&account, endpoint.as_deref(), &sas_token)
    }
}

#[async_trait]
impl ObjectStore for AzureBlobClient {
    async fn list(&self, container: &str) -> Result<Vec<String>, StoreError> {
        validate_container_name(container)?;
        tracing::info!(container, "Listing blobs in container");

        let mut pages = self.service.container_client(container).list_blobs().into_stream();
        let mut names = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                tracing::error!(error = %e, container, "Failed to list blobs");
                store_error(e)
            })?;
            let before = names.len();
            names.extend(page.blobs.blobs().map(|blob| blob.name.clone()));
            tracing::debug!(count = names.len() - before, "Fetched page of blob names");
        }

        tracing::info!(count = names.len(), container, "Listed all blobs in container");
        Ok(names)
    }

    async fn put(
        &self,
        container: &str,
        name: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        validate_container_name(container)?;
        validate_blob_name(name)?;
        tracing::info!(blob = name, container, content_type, size = body.len(), "Uploading blob");

        self.service
            .container_client(container)
            .blob_client(name)
            .put_block_blob(body)
            .content_type(content_type.to_string())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, blob = name, "Failed to upload blob");
                store_error(e)
            })?;

        tracing::info!(blob = name, "Successfully uploaded blob");
        Ok(())
    }

    async fn delete(&self, container: &str, name: &str) -> Result<(), StoreError> {
        validate_container_name(container)?;
        validate_blob_name(name)?;
        tracing::info!(blob = name, container, "Deleting blob");

        self.service
            .container_client(container)
            .blob_client(name)
            .delete()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, blob = name, "Failed to delete blob");
                store_error(e)
            })?;

        tracing::info!(blob = name, "Successfully deleted blob");
        Ok(())
    }
}

fn validate_container_name(container: &str) -> Result<(), StoreError> {
    if container.is_empty() || container.contains('/') {
        return Err(StoreError::invalid_argument(format!(
            "'{container}' is not a valid container name"
        )));
    }
    Ok(())
}

/// Rejects names the request URL cannot address exactly.
///
/// Each `/`-separated segment becomes a URL path segment; `.` and `..` would be
/// normalised away and address a different blob.
fn validate_blob_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.len() > MAX_BLOB_NAME_LEN {
        return Err(StoreError::invalid_argument(format!(
            "blob name must be 1 to {MAX_BLOB_NAME_LEN} characters, got {}",
            name.len()
        )));
    }
    for segment in name.split('/') {
        match segment {
            "" => {
                return Err(StoreError::invalid_argument(format!(
                    "blob name '{name}' has an empty path segment"
                )))
            }
            "." | ".." => {
                return Err(StoreError::invalid_argument(format!(
                    "blob name '{name}' has a relative path segment '{segment}'"
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Maps SDK errors onto the store contract.
fn store_error(error: AzureError) -> StoreError {
    let message = error.to_string().lines().next().unwrap_or_default().to_string();
    match error.kind() {
        ErrorKind::HttpResponse { status, error_code } => {
            let code = error_code.clone().unwrap_or_else(|| status.to_string());
            StoreError::service(code, message)
        }
        ErrorKind::Io => StoreError::service("TransportError", message),
        _ => StoreError::invalid_argument(message),
    }
}
