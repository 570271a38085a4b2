use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::storage::{StorageConfig, DEFAULT_URL};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Enables debug-only endpoints such as `/config`
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `mongo`
    pub backend: String,
    /// Connection URL for the mongo backend
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            debug: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            url: DEFAULT_URL.to_string(),
        }
    }
}

impl StorageSettings {
    pub fn to_storage_config(&self) -> Result<StorageConfig, DomainError> {
        StorageConfig::from_backend(&self.backend, &self.url)
    }
}

/// Plain deployment variables honoured on top of `READIT__*` keys
const PLATFORM_VARS: [(&str, &str); 4] = [
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("DEBUG", "server.debug"),
    ("MONGOURL", "storage.url"),
];

impl AppConfig {
    /// Loads `config/default`, `config/local`, `READIT__*` variables and then
    /// the platform variables `HOST`, `PORT`, `DEBUG` and `MONGOURL`
    ///
    /// Missing sources keep their defaults; a value that fails to deserialize
    /// is an error.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Like [`AppConfig::load`], reading variables from `vars` instead of the
    /// process environment when given
    pub fn load_from(vars: Option<HashMap<String, String>>) -> Result<Self, config::ConfigError> {
        let lookup = |name: &str| match &vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("READIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars.clone()),
            );

        for (name, key) in PLATFORM_VARS {
            builder = match (name, lookup(name)) {
                ("DEBUG", value) => {
                    builder.set_override_option(key, value.map(|v| truthy(&v)))?
                }
                (_, value) => builder.set_override_option(key, value)?,
            };
        }

        builder.build()?.try_deserialize()
    }
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "1" | "yes" | "y"
    )
}
