//! User entity and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::storage::{Record, Storable, PRIMARY_KEY};
use crate::record;

/// Bin that holds registered users
pub const USERS_BIN: &str = "users";

/// Bin that maps session keys to user identifiers
pub const SESSIONS_BIN: &str = "sessions";

/// Attributes released by a completed OpenID login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginDetails {
    pub identity_url: String,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl LoginDetails {
    pub fn new(identity_url: impl Into<String>) -> Self {
        Self {
            identity_url: identity_url.into(),
            ..Default::default()
        }
    }
}

/// A user registered in the system
///
/// Persisted fields are `display_name`, `email` and `open_id`. The user id is
/// assigned by the storage layer and the session key only lives as long as
/// the login, so neither takes part in equality.
#[derive(Debug, Clone, Default, Serialize)]
pub struct User {
    user_id: Option<String>,
    display_name: Option<String>,
    email: Option<String>,
    open_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_key: Option<String>,
}

impl User {
    pub fn new(session_key: Option<String>) -> Self {
        Self {
            session_key,
            ..Default::default()
        }
    }

    /// Updates the user from a successful login
    ///
    /// A session key is generated unless one already exists. The display name
    /// is the first of fullname, nickname, email and identity URL that is set.
    pub fn login(&mut self, details: &LoginDetails) {
        if self.session_key.is_none() {
            self.session_key = Some(Uuid::new_v4().to_string());
        }
        self.open_id = Some(details.identity_url.clone());
        self.display_name = details
            .fullname
            .clone()
            .or_else(|| details.nickname.clone())
            .or_else(|| details.email.clone())
            .or_else(|| Some(details.identity_url.clone()));
        self.email = details.email.clone();
    }

    /// Resets the login-derived fields; `logged_in` answers false afterwards
    pub fn logout(&mut self) {
        self.display_name = None;
        self.email = None;
        self.open_id = None;
        self.session_key = None;
    }

    pub fn logged_in(&self) -> bool {
        self.session_key.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id = Some(user_id.into());
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn open_id(&self) -> Option<&str> {
        self.open_id.as_deref()
    }

    pub fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref()
    }

    pub fn set_session_key(&mut self, session_key: impl Into<String>) {
        self.session_key = Some(session_key.into());
    }
}

impl Storable for User {
    fn to_persistence(&self) -> Record {
        record! {
            "display_name" => self.display_name.clone(),
            "email" => self.email.clone(),
            "open_id" => self.open_id.clone(),
        }
    }

    fn from_persistence(&mut self, record: &Record) {
        if let Some(id) = record.get_str(PRIMARY_KEY) {
            self.user_id = Some(id.to_string());
        }
        if let Some(email) = record.get("email") {
            self.email = email.as_str().map(str::to_string);
        }
        if let Some(open_id) = record.get("open_id") {
            self.open_id = open_id.as_str().map(str::to_string);
        }
        // display name falls back to the email address
        self.display_name = record
            .get_str("display_name")
            .map(str::to_string)
            .or_else(|| self.email.clone());
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.to_persistence() == other.to_persistence()
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "user <{}, email={}, open_id={}>",
            self.user_id.as_deref().unwrap_or("None"),
            self.email.as_deref().unwrap_or("None"),
            self.open_id.as_deref().unwrap_or("None"),
        )
    }
}
