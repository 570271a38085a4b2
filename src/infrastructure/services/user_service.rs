//! User service - login, session lookup and logout

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::storage::{ObjectId, Record, Storable, Storage, StorageExt, StorageId, PRIMARY_KEY};
use crate::domain::user::{LoginDetails, User, SESSIONS_BIN, USERS_BIN};
use crate::domain::DomainError;
use crate::record;

/// User service backed by the `users` and `sessions` bins
pub struct UserService {
    storage: Arc<dyn Storage>,
}

impl Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Completes a login for an identity that has already been verified
    ///
    /// The user is looked up by open id and registered on first login. A new
    /// session is recorded and the returned user carries its key.
    pub async fn login(&self, details: &LoginDetails) -> Result<User, DomainError> {
        if details.identity_url.trim().is_empty() {
            return Err(DomainError::validation("identity_url must not be empty"));
        }

        let existing: Option<User> = self
            .storage
            .retrieve_one_as(
                USERS_BIN,
                None,
                &record! { "open_id" => details.identity_url.as_str() },
            )
            .await?;

        let user = match existing {
            Some(mut user) => {
                user.login(details);
                debug!(user = %user, "Existing user logged in");
                user
            }
            None => self.register(details).await?,
        };

        let session_key = user
            .session_key()
            .map(str::to_string)
            .ok_or_else(|| DomainError::unauthorized("Login did not produce a session"))?;
        let user_id = user
            .user_id()
            .map(str::to_string)
            .ok_or_else(|| DomainError::storage("User has no identifier"))?;

        self.storage
            .save(
                SESSIONS_BIN,
                Some(StorageId::from(session_key.as_str())),
                record! { "user_id" => user_id.as_str() },
            )
            .await?;

        info!(user_id = %user_id, "User logged in");
        Ok(user)
    }

    /// Resolves a session key to the logged-in user
    ///
    /// Sessions that point at a user who no longer exists are discarded.
    pub async fn current(&self, session_key: &str) -> Result<Option<User>, DomainError> {
        let slot = StorageId::from(session_key);
        let Some(session) = self
            .storage
            .retrieve_one(SESSIONS_BIN, Some(slot.clone()), &Record::new())
            .await?
        else {
            return Ok(None);
        };

        let user = match session.get_str("user_id") {
            Some(user_id) => self.find(user_id).await?,
            None => None,
        };

        match user {
            Some(mut user) => {
                user.set_session_key(session_key);
                Ok(Some(user))
            }
            None => {
                warn!("Discarding session without a user");
                self.storage.remove_all(SESSIONS_BIN, &slot).await?;
                Ok(None)
            }
        }
    }

    /// Looks up a registered user by identifier
    pub async fn find(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        let Ok(oid) = user_id.parse::<ObjectId>() else {
            return Ok(None);
        };
        self.storage
            .retrieve_one_as(USERS_BIN, Some(StorageId::from(oid)), &Record::new())
            .await
    }

    /// Ends a session; unknown keys are ignored
    pub async fn logout(&self, session_key: &str) -> Result<(), DomainError> {
        let removed = self
            .storage
            .remove_all(SESSIONS_BIN, &StorageId::from(session_key))
            .await?;

        debug!(removed, "Session ended");
        Ok(())
    }

    async fn register(&self, details: &LoginDetails) -> Result<User, DomainError> {
        let oid = ObjectId::generate();
        let mut user = User::new(None);
        user.set_user_id(oid.to_hex());
        user.login(details);

        let mut persisted = user.to_persistence();
        persisted.insert(PRIMARY_KEY, oid.to_hex());
        self.storage
            .save(USERS_BIN, Some(StorageId::from(oid)), persisted)
            .await?;

        info!(user = %user, "Registered new user");
        Ok(user)
    }
}
