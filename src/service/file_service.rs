//! File service: validator, local store and optional remote mirror behind one interface

use crate::error::{Result, StoreError};
use crate::remote::RemoteObjectStore;
use crate::storage::{FileName, FileStore};
use crate::validator::{is_allowed_filename, secure_filename};
use std::sync::Arc;
use log::{error, info, warn};

pub struct FileService {
    local: Arc<dyn FileStore>,
    remote: Option<Arc<dyn RemoteObjectStore>>,
}

impl FileService {
    /// Create a file service with injected backends
    pub fn new(local: Arc<dyn FileStore>, remote: Option<Arc<dyn RemoteObjectStore>>) -> Self {
        Self { local, remote }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Accepted filenames currently stored
    pub fn list(&self) -> Result<Vec<FileName>> {
        self.local.list()
    }

    /// Always served from the local store
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.local.read(name)
    }

    /// Validate and sanitise `original_name`, store `data` under the sanitised name and
    /// mirror it remotely. Returns the name the file was stored under.
    ///
    /// If the remote upload fails the local write is undone and the remote error returned.
    pub async fn upload(&self, original_name: &str, data: &[u8]) -> Result<FileName> {
        if !is_allowed_filename(original_name) {
            warn!("Rejected upload with filename {:?}", original_name);
            return Err(StoreError::InvalidInput(format!("Invalid file type: {:?}", original_name)));
        }
        let name = secure_filename(original_name);
        if !is_allowed_filename(&name) {
            warn!("Filename {:?} sanitised to unusable {:?}", original_name, name);
            return Err(StoreError::InvalidInput(format!("Invalid file name: {:?}", original_name)));
        }

        let remote = match &self.remote {
            Some(remote) => remote,
            None => {
                self.local.save(&name, data)?;
                return Ok(name);
            }
        };

        let previous = match self.local.read(&name) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        self.local.save(&name, data)?;

        if let Err(e) = remote.upload(&name, data).await {
            error!("Failed to upload {} to {} store: {}", name, remote.name(), e);
            self.roll_back(&name, previous);
            return Err(e);
        }
        info!("Stored {} locally and in {} store", name, remote.name());
        Ok(name)
    }

    /// Delete `name` remotely first, then locally. A blob already missing remotely is
    /// tolerated; any other remote error leaves the local file in place.
    pub async fn delete(&self, name: &str) -> Result<()> {
        if !self.local.exists(name)? {
            return Err(StoreError::NotFound(name.to_string()));
        }

        if let Some(remote) = &self.remote {
            match remote.delete(name).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    warn!("{} was already missing from {} store", name, remote.name());
                }
                Err(e) => {
                    error!("Failed to delete {} from {} store: {}", name, remote.name(), e);
                    return Err(e);
                }
            }
        }

        self.local.delete(name)
    }

    fn roll_back(&self, name: &str, previous: Option<Vec<u8>>) {
        let result = match previous {
            Some(bytes) => self.local.save(name, &bytes),
            None => self.local.delete(name),
        };
        match result {
            Ok(()) => info!("Rolled back local copy of {}", name),
            Err(e) => error!("Failed to roll back local copy of {}: {}", name, e),
        }
    }
}
