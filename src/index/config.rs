//! Construction of the configured photo index

use crate::config::{IndexBackend, IndexConfig};
use crate::error::Result;
use crate::index::{PhotoIndex, mock_store::MockPhotoIndex, sqlite_store::SqlitePhotoIndex};
use std::sync::Arc;
use log::info;

/// Create the photo index, or `None` when it is disabled
pub fn create_store(config: &IndexConfig) -> Result<Option<Arc<dyn PhotoIndex>>> {
    match config.backend {
        IndexBackend::Disabled => {
            info!("Photo index disabled");
            Ok(None)
        }
        IndexBackend::SQLite => {
            info!("Using SQLite photo index with db_path: {}, wal_mode: {}", config.db_path, config.wal_mode);
            let index: Arc<dyn PhotoIndex> = Arc::new(SqlitePhotoIndex::open(&config.db_path, config.wal_mode)?);
            Ok(Some(index))
        }
        IndexBackend::Mock => {
            info!("Using mock photo index");
            let index: Arc<dyn PhotoIndex> = Arc::new(MockPhotoIndex::new());
            Ok(Some(index))
        }
    }
}
