//! Session authentication using the `X-Session-Key` header

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

/// Header carrying the session key issued by `POST /login`
pub const SESSION_HEADER: &str = "x-session-key";

/// Extractor that requires a live session
///
/// The wrapped user always has a user id and a session key.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl RequireUser {
    pub fn user_id(&self) -> &str {
        self.0.user_id().unwrap_or_default()
    }

    pub fn session_key(&self) -> &str {
        self.0.session_key().unwrap_or_default()
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_key = extract_session_key(&parts.headers)?;

        let user = state
            .user_service
            .current(&session_key)
            .await?
            .filter(|user| user.user_id().is_some())
            .ok_or_else(|| ApiError::unauthorized("Session is not valid, log in again"))?;

        debug!(user = %user, "Session resolved");
        Ok(RequireUser(user))
    }
}

/// Extract the session key from the request headers
pub fn extract_session_key(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(SESSION_HEADER)
        .ok_or_else(|| ApiError::unauthorized("Login required. Provide the 'X-Session-Key' header"))?;

    let key = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid X-Session-Key header encoding"))?
        .trim();

    if key.is_empty() {
        return Err(ApiError::unauthorized("Login required. Provide the 'X-Session-Key' header"));
    }
    Ok(key.to_string())
}
