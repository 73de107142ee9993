//! Directory-backed file store

use crate::error::{Result, StoreError};
use crate::storage::{check_component, FileName, FileStore};
use crate::validator::is_allowed_filename;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::{debug, info};

/// Keeps every file directly inside one managed directory
pub struct LocalFileStore {
    directory: PathBuf,
}

impl LocalFileStore {
    /// Open the store, creating the directory if it does not exist yet
    pub fn new(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.exists() {
            fs::create_dir_all(&directory)
                .map_err(|e| StoreError::from_io(&directory.display().to_string(), e))?;
            info!("Created files directory: {}", directory.display());
        }
        info!("Using files directory: {}", directory.display());
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> Result<PathBuf> {
        check_component(name)?;
        Ok(self.directory.join(name))
    }
}

impl FileStore for LocalFileStore {
    fn list(&self) -> Result<Vec<FileName>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            // Names that are not valid UTF-8 can never pass the validator
            if let Ok(name) = entry.file_name().into_string() {
                if is_allowed_filename(&name) {
                    names.push(name);
                }
            }
        }
        debug!("Listed {} files in {}", names.len(), self.directory.display());
        Ok(names)
    }

    fn save(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.file_path(name)?;
        let mut file = fs::File::create(&path).map_err(|e| StoreError::from_io(name, e))?;
        file.write_all(data).map_err(|e| StoreError::from_io(name, e))?;
        file.flush().map_err(|e| StoreError::from_io(name, e))?;
        info!("Saved {} ({} bytes)", name, data.len());
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.file_path(name)?;
        if path.is_dir() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let data = fs::read(&path).map_err(|e| StoreError::from_io(name, e))?;
        debug!("Read {} ({} bytes)", name, data.len());
        Ok(data)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.file_path(name)?;
        if path.is_dir() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        fs::remove_file(&path).map_err(|e| StoreError::from_io(name, e))?;
        info!("Deleted {}", name);
        Ok(())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.file_path(name)?.is_file())
    }
}
