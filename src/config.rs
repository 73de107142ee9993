//! Application Configuration
//!
//! This module provides configuration management for the application,
//! supporting YAML configuration files with sensible defaults and a few
//! environment overrides for backend selection.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use log::{info, warn};

use crate::error::{Result, StoreError};

/// Default configuration file, overridable with `PHOTO_DROP_CONFIG`
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Bucket the remote mirror writes to unless configured otherwise
pub const DEFAULT_BUCKET_NAME: &str = "proj1-rn";

/// Local file store backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum StorageBackend {
    #[default]
    Local,
    Mock,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "disk" => Ok(StorageBackend::Local),
            "mock" => Ok(StorageBackend::Mock),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// Remote object store backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum RemoteBackend {
    #[default]
    Disabled,
    Http,
    Mock,
}

impl std::str::FromStr for RemoteBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" | "none" | "off" => Ok(RemoteBackend::Disabled),
            "http" | "s3" => Ok(RemoteBackend::Http),
            "mock" => Ok(RemoteBackend::Mock),
            _ => Err(format!("Unknown remote backend: {}", s)),
        }
    }
}

/// Photo metadata index backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum IndexBackend {
    #[default]
    Disabled,
    SQLite,
    Mock,
}

impl std::str::FromStr for IndexBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" | "none" | "off" => Ok(IndexBackend::Disabled),
            "sqlite" => Ok(IndexBackend::SQLite),
            "mock" => Ok(IndexBackend::Mock),
            _ => Err(format!("Unknown index backend: {}", s)),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Local file store configuration
    pub storage: StorageConfig,
    /// Remote mirror configuration
    pub remote: RemoteConfig,
    /// Photo metadata index configuration
    pub index: IndexConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Largest accepted upload in bytes
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: 4,
            max_payload_size: 32 * 1024 * 1024,
        }
    }
}

/// Local file store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding the accepted images
    pub directory: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            directory: "./files".to_string(),
        }
    }
}

/// Remote mirror configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub backend: RemoteBackend,
    /// Base URL of the object store, without the bucket
    pub endpoint: String,
    pub bucket: String,
    pub timeout_secs: u64,
    /// Sent as a bearer token when set
    pub auth_token: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: RemoteBackend::Disabled,
            endpoint: "http://127.0.0.1:9710".to_string(),
            bucket: DEFAULT_BUCKET_NAME.to_string(),
            timeout_secs: 30,
            auth_token: None,
        }
    }
}

/// Photo metadata index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    /// Database file path
    pub db_path: String,
    /// Enable WAL mode
    pub wal_mode: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Disabled,
            db_path: "./data/photos.db".to_string(),
            wal_mode: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path to the log4rs configuration file
    pub config_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            config_file: "server_log.yaml".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `PHOTO_DROP_CONFIG` or `config.yaml`, use defaults if not
    /// found, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = env::var("PHOTO_DROP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Read a YAML configuration file; a missing file yields the defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| StoreError::from_io(&path.display().to_string(), e))?;
        let config = Self::from_yaml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Apply `STORAGE_BACKEND`, `FILES_DIRECTORY`, `REMOTE_BACKEND`, `REMOTE_BUCKET` and
    /// `INDEX_BACKEND` when set. Unparseable backends are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(backend) = backend_from_env::<StorageBackend>("STORAGE_BACKEND") {
            self.storage.backend = backend;
        }
        if let Ok(dir) = env::var("FILES_DIRECTORY") {
            info!("Using files directory from environment: {}", dir);
            self.storage.directory = dir;
        }
        if let Some(backend) = backend_from_env::<RemoteBackend>("REMOTE_BACKEND") {
            self.remote.backend = backend;
        }
        if let Ok(bucket) = env::var("REMOTE_BUCKET") {
            info!("Using remote bucket from environment: {}", bucket);
            self.remote.bucket = bucket;
        }
        if let Some(backend) = backend_from_env::<IndexBackend>("INDEX_BACKEND") {
            self.index.backend = backend;
        }
    }

    /// Configuration used by tests: in-memory stores everywhere
    pub fn for_testing() -> Self {
        let mut config = Self::default();
        config.storage.backend = StorageBackend::Mock;
        config.remote.backend = RemoteBackend::Mock;
        config.index.backend = IndexBackend::Mock;
        config
    }
}

fn backend_from_env<T>(var: &str) -> Option<T>
where
    T: std::str::FromStr<Err = String> + std::fmt::Debug,
{
    let value = env::var(var).ok()?;
    match value.parse::<T>() {
        Ok(backend) => {
            info!("Using {} from environment: {:?}", var, backend);
            Some(backend)
        }
        Err(e) => {
            warn!("Invalid {} in environment: {}. Keeping configured value.", var, e);
            None
        }
    }
}
