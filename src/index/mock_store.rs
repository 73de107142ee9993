//! Mock implementation of PhotoIndex for testing

use crate::error::Result;
use crate::index::{PhotoFilter, PhotoIndex, PhotoKey, PhotoRecord, StoredPhoto};
use std::sync::Mutex;
use log::info;

/// In-memory index; keys count up from 1
pub struct MockPhotoIndex {
    records: Mutex<Vec<StoredPhoto>>,
}

impl MockPhotoIndex {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl Default for MockPhotoIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoIndex for MockPhotoIndex {
    fn add(&self, record: &PhotoRecord) -> Result<PhotoKey> {
        let mut records = self.records.lock().unwrap();
        let key = records.len() as PhotoKey + 1;
        records.push(StoredPhoto { key, record: record.clone() });
        info!("Mock: Added photo {} with data: {:?}", key, record);
        Ok(key)
    }

    fn fetch(&self, filters: &[PhotoFilter]) -> Result<Vec<StoredPhoto>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|photo| filters.iter().all(|f| f.matches(&photo.record)))
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<StoredPhoto>> {
        let photos = self.fetch(&[])?;
        for photo in &photos {
            info!("{:?}", photo);
        }
        Ok(photos)
    }
}
