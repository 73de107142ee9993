//! Construction of the configured file store

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::storage::{FileStore, local_store::LocalFileStore, mock_store::MockFileStore};
use std::sync::Arc;
use log::info;

/// Create a file store instance based on the configuration
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn FileStore>> {
    match config.backend {
        StorageBackend::Local => {
            info!("Using local file store in {}", config.directory);
            Ok(Arc::new(LocalFileStore::new(&config.directory)?))
        }
        StorageBackend::Mock => {
            info!("Using mock file store");
            Ok(Arc::new(MockFileStore::new()))
        }
    }
}
