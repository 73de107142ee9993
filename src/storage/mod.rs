//! Local File Store Abstraction
//!
//! This module provides an abstraction over the place accepted images are kept,
//! allowing the service to use a directory on disk or an in-memory store
//! without affecting the request handlers.

pub mod local_store;
pub mod mock_store;
pub mod config;


use crate::error::{Result, StoreError};

/// Filename of a stored image, also used as its remote key
pub type FileName = String;

/// Trait defining the local file store interface
pub trait FileStore: Send + Sync {
    /// Names of stored files that pass the filename validator, in no particular order
    fn list(&self) -> Result<Vec<FileName>>;

    /// Write the whole buffer under `name`, replacing any previous content
    fn save(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Read the content stored under `name`
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Remove `name`; `NotFound` if it is not there
    fn delete(&self, name: &str) -> Result<()>;

    /// Check whether `name` is present
    fn exists(&self, name: &str) -> Result<bool>;
}

/// Reject names that would address anything other than a direct child of the store.
pub fn check_component(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(StoreError::InvalidInput(format!("Invalid file name: {:?}", name)));
    }
    Ok(())
}
