//! Mock implementation of FileStore for testing

use crate::error::{Result, StoreError};
use crate::storage::{check_component, FileName, FileStore};
use crate::validator::is_allowed_filename;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use log::info;

/// In-memory FileStore
pub struct MockFileStore {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockFileStore {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of files held, whatever their extension
    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.files.lock().unwrap().clear();
    }
}

impl Default for MockFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore for MockFileStore {
    fn list(&self) -> Result<Vec<FileName>> {
        let files = self.files.lock().unwrap();
        Ok(files.keys().filter(|name| is_allowed_filename(name)).cloned().collect())
    }

    fn save(&self, name: &str, data: &[u8]) -> Result<()> {
        check_component(name)?;
        self.files.lock().unwrap().insert(name.to_string(), data.to_vec());
        info!("Mock: Saved {} ({} bytes)", name, data.len());
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        check_component(name)?;
        self.files
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn delete(&self, name: &str) -> Result<()> {
        check_component(name)?;
        match self.files.lock().unwrap().remove(name) {
            Some(_) => {
                info!("Mock: Deleted {}", name);
                Ok(())
            }
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    fn exists(&self, name: &str) -> Result<bool> {
        check_component(name)?;
        Ok(self.files.lock().unwrap().contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_file_store_basic_operations() {
        let store = MockFileStore::new();
        assert_eq!(store.file_count(), 0);

        store.save("a.jpg", b"a").unwrap();
        store.save("notes.txt", b"n").unwrap();
        assert_eq!(store.file_count(), 2);
        assert_eq!(store.list().unwrap(), vec!["a.jpg".to_string()]);
        assert_eq!(store.read("a.jpg").unwrap(), b"a");

        store.delete("a.jpg").unwrap();
        assert!(!store.exists("a.jpg").unwrap());

        store.clear();
        assert_eq!(store.file_count(), 0);
    }

    #[test]
    fn test_mock_file_store_error_cases() {
        let store = MockFileStore::new();
        assert!(store.read("missing.jpg").unwrap_err().is_not_found());
        assert!(store.delete("missing.jpg").unwrap_err().is_not_found());
        assert!(matches!(store.save("", b"x"), Err(StoreError::InvalidInput(_))));
    }
}
