//! Read It
//!
//! A personal reading-list tracker built around a small document storage
//! layer:
//! - Bin/slot storage with in-memory and MongoDB backends
//! - Constraint filtering and a strict single-result lookup
//! - Users and readings persisted through the storage layer
//! - A JSON HTTP API for sessions and reading lists

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use api::state::AppState;
use infrastructure::storage::StorageFactory;
use tracing::info;

/// Create the application state with the default configuration
pub fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(AppConfig::default())
}

/// Create the application state with custom configuration
///
/// The storage backend is chosen by `storage.backend`; an unknown backend is a
/// configuration error rather than a silent fallback.
pub fn create_app_state_with_config(config: AppConfig) -> anyhow::Result<AppState> {
    let storage_config = config.storage.to_storage_config()?;
    info!(backend = ?storage_config.storage_type(), "Storage backend selected");

    let storage = StorageFactory::create(&storage_config);
    Ok(AppState::new(storage, config))
}
