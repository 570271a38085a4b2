//! Configuration dump, only served in debug mode

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::config::AppConfig;
use crate::domain::DomainError;

/// GET /config
pub async fn dump_configuration(
    State(state): State<AppState>,
) -> Result<Json<AppConfig>, ApiError> {
    if !state.config.server.debug {
        return Err(DomainError::forbidden("Configuration is only available in debug mode").into());
    }
    Ok(Json(state.config.as_ref().clone()))
}
