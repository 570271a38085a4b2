//! User domain
//!
//! A user is identified by an OpenID identity URL and tracks whether it is
//! logged in through a session key.

mod entity;

pub use entity::{LoginDetails, User, SESSIONS_BIN, USERS_BIN};
