//! Mock implementation of RemoteObjectStore for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use log::info;

use crate::error::{Result, StoreError};
use crate::remote::RemoteObjectStore;

/// In-memory bucket that can be switched into an unavailable mode
pub struct MockRemoteStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    unavailable: AtomicBool,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(Mutex::new(HashMap::new())),
            unavailable: AtomicBool::new(false),
        }
    }

    /// While set, every call fails with `TransientFailure`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn object_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::TransientFailure("mock remote store is unavailable".to_string()));
        }
        Ok(())
    }
}

impl Default for MockRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteObjectStore for MockRemoteStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        self.check_available()?;
        self.blobs.lock().unwrap().insert(key.to_string(), data.to_vec());
        info!("Mock: Uploaded {} ({} bytes)", key, data.len());
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        self.check_available()?;
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_available()?;
        match self.blobs.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self.blobs.lock().unwrap().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_remote_store_basic_operations() {
        let store = MockRemoteStore::new();
        store.upload("a.jpg", b"bytes").await.unwrap();
        assert!(store.contains("a.jpg"));
        assert_eq!(store.download("a.jpg").await.unwrap(), b"bytes");
        assert_eq!(store.list().await.unwrap(), vec!["a.jpg".to_string()]);

        store.delete("a.jpg").await.unwrap();
        assert_eq!(store.object_count(), 0);
        assert!(store.delete("a.jpg").await.unwrap_err().is_not_found());
        assert!(store.download("a.jpg").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unavailable_mode() {
        let store = MockRemoteStore::new();
        store.set_unavailable(true);
        assert!(store.upload("a.jpg", b"x").await.unwrap_err().is_retryable());
        assert!(store.list().await.unwrap_err().is_retryable());
        assert_eq!(store.object_count(), 0);

        store.set_unavailable(false);
        store.upload("a.jpg", b"x").await.unwrap();
        assert!(store.contains("a.jpg"));
    }
}
