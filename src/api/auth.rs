//! Session endpoints
//!
//! The OpenID exchange happens elsewhere; `POST /login` receives the attributes
//! of an identity that has already been verified.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tracing::info;

use crate::api::middleware::{extract_session_key, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{LoginDetails, User};

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(current_user))
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session_key: String,
    pub user: UserResponse,
}

/// User response (safe to expose)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub open_id: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id().map(str::to_string),
            display_name: user.display_name().map(str::to_string),
            email: user.email().map(str::to_string),
            open_id: user.open_id().map(str::to_string),
        }
    }
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(details): Json<LoginDetails>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.user_service.login(&details).await?;
    let session_key = user
        .session_key()
        .map(str::to_string)
        .ok_or_else(|| ApiError::internal("Login did not produce a session"))?;

    info!(user = %user, "Logged in");
    Ok(Json(LoginResponse {
        session_key,
        user: UserResponse::from(&user),
    }))
}

/// POST /logout
///
/// Always succeeds for a well-formed header, whether or not the session exists.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session_key = extract_session_key(&headers)?;
    state.user_service.logout(&session_key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /me
pub async fn current_user(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
