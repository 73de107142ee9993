//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.

use std::sync::Arc;
use log::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::index::{self, PhotoIndex, mock_store::MockPhotoIndex};
use crate::remote::{self, RemoteObjectStore, mock_store::MockRemoteStore};
use crate::service::file_service::FileService;
use crate::service::photo_service::PhotoService;
use crate::storage::{self, FileStore, mock_store::MockFileStore};

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub file_service: Arc<FileService>,
    /// Present only when a photo index backend is configured
    pub photo_service: Option<Arc<PhotoService>>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state from the configuration file and environment
    pub fn new() -> Result<Self> {
        Self::from_config(AppConfig::load()?)
    }

    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> Result<Self> {
        info!("Initializing application state with configuration");

        let local = storage::config::create_store(&config.storage)?;
        let remote = remote::config::create_store(&config.remote)?;
        let index = index::config::create_store(&config.index)?;

        let state = Self::with_backends(config, local, remote, index);
        info!("Application state initialized successfully");
        Ok(state)
    }

    /// Assemble the services around already constructed backends
    pub fn with_backends(
        config: AppConfig,
        local: Arc<dyn FileStore>,
        remote: Option<Arc<dyn RemoteObjectStore>>,
        index: Option<Arc<dyn PhotoIndex>>,
    ) -> Self {
        Self {
            file_service: Arc::new(FileService::new(local, remote)),
            photo_service: index.map(|index| Arc::new(PhotoService::new(index))),
            config,
        }
    }

    /// Create application state for testing with mock backends
    pub fn new_for_testing() -> Self {
        let local: Arc<dyn FileStore> = Arc::new(MockFileStore::new());
        let remote: Arc<dyn RemoteObjectStore> = Arc::new(MockRemoteStore::new());
        let index: Arc<dyn PhotoIndex> = Arc::new(MockPhotoIndex::new());
        Self::with_backends(AppConfig::for_testing(), local, Some(remote), Some(index))
    }
}
