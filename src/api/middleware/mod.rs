//! API middleware components

pub mod session;

pub use session::{extract_session_key, RequireUser, SESSION_HEADER};
