//! Construction of the configured remote mirror

use crate::config::{RemoteBackend, RemoteConfig};
use crate::error::Result;
use crate::remote::{RemoteObjectStore, http_store::HttpObjectStore, mock_store::MockRemoteStore};
use std::sync::Arc;
use std::time::Duration;
use log::info;

/// Create the remote store, or `None` when mirroring is disabled
pub fn create_store(config: &RemoteConfig) -> Result<Option<Arc<dyn RemoteObjectStore>>> {
    match config.backend {
        RemoteBackend::Disabled => {
            info!("Remote mirroring disabled");
            Ok(None)
        }
        RemoteBackend::Http => {
            info!("Mirroring to {} bucket {}", config.endpoint, config.bucket);
            let store = HttpObjectStore::new(
                &config.endpoint,
                &config.bucket,
                Duration::from_secs(config.timeout_secs),
                config.auth_token.clone(),
            )?;
            let store: Arc<dyn RemoteObjectStore> = Arc::new(store);
            Ok(Some(store))
        }
        RemoteBackend::Mock => {
            info!("Using mock remote store");
            let store: Arc<dyn RemoteObjectStore> = Arc::new(MockRemoteStore::new());
            Ok(Some(store))
        }
    }
}
