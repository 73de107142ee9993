//! Photo Metadata Index
//!
//! A record store for structured photo metadata, queryable by equality
//! filters on any field. It is a separate optional feature: the upload and
//! delete flow never writes to it.

pub mod sqlite_store;
pub mod mock_store;
pub mod config;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// System-generated key of a stored record
pub type PhotoKey = i64;

/// Metadata describing one photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoRecord {
    pub name: String,
    pub url: String,
    pub user: String,
    /// Unix seconds
    pub timestamp: i64,
}

impl PhotoRecord {
    /// Record stamped with the current time
    pub fn new(name: impl Into<String>, url: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user: user.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// A record together with the key the index assigned to it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredPhoto {
    pub key: PhotoKey,
    #[serde(flatten)]
    pub record: PhotoRecord,
}

/// Equality predicate on a single `PhotoRecord` field
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoFilter {
    Name(String),
    Url(String),
    User(String),
    Timestamp(i64),
}

impl PhotoFilter {
    /// Build a filter from a field name and its textual value.
    ///
    /// Unknown field names and non-integer timestamps are `InvalidInput`.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        match field {
            "name" => Ok(PhotoFilter::Name(value.to_string())),
            "url" => Ok(PhotoFilter::Url(value.to_string())),
            "user" => Ok(PhotoFilter::User(value.to_string())),
            "timestamp" => value
                .parse::<i64>()
                .map(PhotoFilter::Timestamp)
                .map_err(|_| StoreError::InvalidInput(format!("timestamp must be an integer, got {:?}", value))),
            other => Err(StoreError::InvalidInput(format!("Unknown photo field: {}", other))),
        }
    }

    /// Build filters from `(field, value)` pairs, failing on the first bad one
    pub fn parse_all<'a, I>(pairs: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs.into_iter().map(|(field, value)| Self::parse(field, value)).collect()
    }

    /// Column the predicate applies to
    pub fn field(&self) -> &'static str {
        match self {
            PhotoFilter::Name(_) => "name",
            PhotoFilter::Url(_) => "url",
            PhotoFilter::User(_) => "user",
            PhotoFilter::Timestamp(_) => "timestamp",
        }
    }

    pub fn matches(&self, record: &PhotoRecord) -> bool {
        match self {
            PhotoFilter::Name(name) => &record.name == name,
            PhotoFilter::Url(url) => &record.url == url,
            PhotoFilter::User(user) => &record.user == user,
            PhotoFilter::Timestamp(ts) => record.timestamp == *ts,
        }
    }
}

/// Trait defining the photo metadata index interface
pub trait PhotoIndex: Send + Sync {
    /// Persist a record and return the key assigned to it
    fn add(&self, record: &PhotoRecord) -> Result<PhotoKey>;

    /// Records matching every filter; an empty slice matches everything
    fn fetch(&self, filters: &[PhotoFilter]) -> Result<Vec<StoredPhoto>>;

    /// Every record, each also written to the log
    fn list(&self) -> Result<Vec<StoredPhoto>>;
}
