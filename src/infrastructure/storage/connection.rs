//! Process-wide MongoDB client

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use mongodb::Client;
use once_cell::sync::Lazy;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::DomainError;

static SHARED: Lazy<Arc<SharedConnection>> = Lazy::new(|| Arc::new(SharedConnection::new()));

/// Lazily established client shared by every Mongo-backed storage
///
/// The first caller connects; concurrent first callers wait on the init lock
/// and then reuse the client the winner stored. `close` drops the client and
/// the next `client` call reconnects.
#[derive(Debug, Default)]
pub struct SharedConnection {
    client: RwLock<Option<Client>>,
    init: Mutex<()>,
    connects: AtomicUsize,
}

impl SharedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The connection shared across the process
    pub fn global() -> Arc<SharedConnection> {
        Arc::clone(&*SHARED)
    }

    /// Returns the cached client, connecting to `url` if there is none
    ///
    /// Once connected, `url` is ignored until the connection is closed.
    pub async fn client(&self, url: &str) -> Result<Client, DomainError> {
        if let Some(client) = self.cached()? {
            return Ok(client);
        }

        let _guard = self.init.lock().await;
        if let Some(client) = self.cached()? {
            return Ok(client);
        }

        debug!(url = %url, "Connecting to MongoDB");
        let client = Client::with_uri_str(url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to MongoDB: {}", e)))?;

        {
            let mut slot = self.client.write().map_err(|e| {
                DomainError::storage(format!("Failed to acquire write lock: {}", e))
            })?;
            *slot = Some(client.clone());
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        info!("MongoDB client established");

        Ok(client)
    }

    /// Shuts down the cached client, if any
    pub async fn close(&self) -> Result<(), DomainError> {
        let _guard = self.init.lock().await;
        let client = {
            let mut slot = self.client.write().map_err(|e| {
                DomainError::storage(format!("Failed to acquire write lock: {}", e))
            })?;
            slot.take()
        };

        if let Some(client) = client {
            client.shutdown().await;
            info!("MongoDB client closed");
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.client.read().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Number of clients created over the lifetime of this connection
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn cached(&self) -> Result<Option<Client>, DomainError> {
        let slot = self.client.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(slot.clone())
    }
}
