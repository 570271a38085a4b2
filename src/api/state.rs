//! Application state for shared services

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::storage::Storage;
use crate::domain::{DomainError, LoginDetails, Reading, User};
use crate::infrastructure::services::{AddReadingRequest, ReadingService, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub reading_service: Arc<dyn ReadingServiceTrait>,
    pub config: Arc<AppConfig>,
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn login(&self, details: &LoginDetails) -> Result<User, DomainError>;
    async fn current(&self, session_key: &str) -> Result<Option<User>, DomainError>;
    async fn logout(&self, session_key: &str) -> Result<(), DomainError>;
}

/// Trait for reading service operations
#[async_trait::async_trait]
pub trait ReadingServiceTrait: Send + Sync {
    async fn add(&self, user_id: &str, request: AddReadingRequest)
        -> Result<Reading, DomainError>;
    async fn list(&self, user_id: &str) -> Result<Vec<Reading>, DomainError>;
    async fn remove(&self, user_id: &str, reading_id: &str) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl UserServiceTrait for UserService {
    async fn login(&self, details: &LoginDetails) -> Result<User, DomainError> {
        UserService::login(self, details).await
    }

    async fn current(&self, session_key: &str) -> Result<Option<User>, DomainError> {
        UserService::current(self, session_key).await
    }

    async fn logout(&self, session_key: &str) -> Result<(), DomainError> {
        UserService::logout(self, session_key).await
    }
}

#[async_trait::async_trait]
impl ReadingServiceTrait for ReadingService {
    async fn add(
        &self,
        user_id: &str,
        request: AddReadingRequest,
    ) -> Result<Reading, DomainError> {
        ReadingService::add(self, user_id, request).await
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Reading>, DomainError> {
        ReadingService::list(self, user_id).await
    }

    async fn remove(&self, user_id: &str, reading_id: &str) -> Result<(), DomainError> {
        ReadingService::remove(self, user_id, reading_id).await
    }
}

impl AppState {
    /// Builds the services on top of a single storage
    pub fn new(storage: Arc<dyn Storage>, config: AppConfig) -> Self {
        Self {
            user_service: Arc::new(UserService::new(storage.clone())),
            reading_service: Arc::new(ReadingService::new(storage.clone())),
            storage,
            config: Arc::new(config),
        }
    }
}
