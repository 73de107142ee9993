//! Photo index service: typed access to the optional metadata index

use crate::error::Result;
use crate::index::{PhotoFilter, PhotoIndex, PhotoKey, PhotoRecord, StoredPhoto};
use std::sync::Arc;
use log::debug;

pub struct PhotoService {
    index: Arc<dyn PhotoIndex>,
}

impl PhotoService {
    pub fn new(index: Arc<dyn PhotoIndex>) -> Self {
        Self { index }
    }

    pub fn add(&self, record: &PhotoRecord) -> Result<PhotoKey> {
        self.index.add(record)
    }

    /// Parse `(field, value)` pairs into filters and fetch the matching records
    pub fn fetch_by<'a, I>(&self, pairs: I) -> Result<Vec<StoredPhoto>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let filters = PhotoFilter::parse_all(pairs)?;
        debug!("Fetching photos with {} filters", filters.len());
        self.index.fetch(&filters)
    }

    pub fn fetch(&self, filters: &[PhotoFilter]) -> Result<Vec<StoredPhoto>> {
        self.index.fetch(filters)
    }

    pub fn list(&self) -> Result<Vec<StoredPhoto>> {
        self.index.list()
    }
}
