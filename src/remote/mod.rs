//! Remote Object Store
//!
//! Optional mirror of the local file store in a single bucket, keyed by
//! filename. Reads are always served locally; the mirror only sees uploads
//! and deletes.

pub mod http_store;
pub mod mock_store;
pub mod config;

use async_trait::async_trait;

use crate::error::Result;

/// Trait for remote object store backends
#[async_trait]
pub trait RemoteObjectStore: Send + Sync {
    /// Human-readable backend name for logs
    fn name(&self) -> &str;

    /// Upload `data` under `key`, replacing any existing blob
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Download the blob stored under `key`
    async fn download(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete the blob stored under `key`; `NotFound` if there is none
    async fn delete(&self, key: &str) -> Result<()>;

    /// Keys of all blobs in the bucket
    async fn list(&self) -> Result<Vec<String>>;
}
