//! Storage factory for runtime storage selection

use std::sync::Arc;

use crate::domain::storage::{IdExtractor, Storage};
use crate::domain::DomainError;

use super::in_memory::InMemoryStorage;
use super::mongo::{MongoConfig, MongoStorage};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// MongoDB storage
    Mongo,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "mongo" | "mongodb" => Some(Self::Mongo),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Mongo(MongoConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn mongo(config: MongoConfig) -> Self {
        Self::Mongo(config)
    }

    pub fn mongo_url(url: impl Into<String>) -> Self {
        Self::Mongo(MongoConfig::new(url))
    }

    /// Builds a configuration from a backend name and connection URL
    pub fn from_backend(backend: &str, url: &str) -> Result<Self, DomainError> {
        match StorageType::from_str(backend) {
            Some(StorageType::InMemory) => Ok(Self::InMemory),
            Some(StorageType::Mongo) => Ok(Self::mongo_url(url)),
            None => Err(DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                backend
            ))),
        }
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Mongo(_) => StorageType::Mongo,
        }
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a storage instance based on the configuration
    pub fn create(config: &StorageConfig) -> Arc<dyn Storage> {
        Self::create_with_extractor(config, None)
    }

    /// Creates a storage instance that derives missing identifiers with `extractor`
    pub fn create_with_extractor(
        config: &StorageConfig,
        extractor: Option<IdExtractor>,
    ) -> Arc<dyn Storage> {
        match (config, extractor) {
            (StorageConfig::InMemory, None) => Arc::new(InMemoryStorage::new()),
            (StorageConfig::InMemory, Some(extractor)) => {
                Arc::new(InMemoryStorage::new().with_id_extractor(extractor))
            }
            (StorageConfig::Mongo(mongo), None) => Arc::new(MongoStorage::new(mongo.clone())),
            (StorageConfig::Mongo(mongo), Some(extractor)) => {
                Arc::new(MongoStorage::new(mongo.clone()).with_id_extractor(extractor))
            }
        }
    }

    /// Creates an in-memory storage
    pub fn create_in_memory() -> Arc<InMemoryStorage> {
        Arc::new(InMemoryStorage::new())
    }
}
