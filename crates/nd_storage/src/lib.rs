use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use nd_core::{ArticleStorage, Error, Result};

pub mod backends;
pub mod merge;

pub use backends::*;
pub use merge::{
    assign_missing_ids, filter_recent, generate_article_id, merge_articles, validate_article,
    RETENTION_HOURS,
};

pub const DEFAULT_STORAGE_PATH: &str = ".tmp/articles.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Json,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "json" | "file" => Ok(Self::Json),
            other => Err(Error::Config(format!(
                "Unknown storage backend: {} (expected memory or json)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
    /// Copied into `path` the first time it is missing.
    pub seed_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORAGE_PATH),
            seed_path: None,
        }
    }
}

impl StorageConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed_path: None,
        }
    }

    pub fn with_seed(mut self, seed: impl Into<PathBuf>) -> Self {
        self.seed_path = Some(seed.into());
        self
    }
}

pub fn create_storage(kind: StorageKind, config: StorageConfig) -> Arc<dyn ArticleStorage> {
    match kind {
        StorageKind::Memory => Arc::new(InMemoryStorage::new()),
        StorageKind::Json => Arc::new(JsonFileStorage::new(config)),
    }
}

/// `last_updated` stamp for a write happening now.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub mod prelude {
    pub use super::{create_storage, StorageConfig, StorageKind};
    pub use super::backends::*;
    pub use nd_core::ArticleStorage;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("JSON".parse::<StorageKind>().unwrap(), StorageKind::Json);
        assert!("qdrant".parse::<StorageKind>().is_err());
    }

    #[test]
    fn test_timestamp_format() {
        let stamp = timestamp_now();
        assert!(stamp.ends_with('Z'));
        assert!(nd_core::time::parse_timestamp(&stamp).is_some());
    }
}
