//! Reading list endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::Reading;
use crate::infrastructure::services::AddReadingRequest;

pub fn create_readings_router() -> Router<AppState> {
    Router::new()
        .route("/readings", get(list_readings).post(add_reading))
        .route("/readings/{id}", delete(remove_reading))
}

/// Body of `POST /readings`
#[derive(Debug, Deserialize)]
pub struct AddReadingBody {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct ReadingsResponse {
    pub readings: Vec<Reading>,
}

/// GET /readings - newest first
pub async fn list_readings(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<Json<ReadingsResponse>, ApiError> {
    let readings = state.reading_service.list(user.user_id()).await?;
    Ok(Json(ReadingsResponse { readings }))
}

/// POST /readings
pub async fn add_reading(
    State(state): State<AppState>,
    user: RequireUser,
    Json(body): Json<AddReadingBody>,
) -> Result<(StatusCode, Json<Reading>), ApiError> {
    let request = AddReadingRequest {
        title: body.title,
        link: body.link,
    };
    let reading = state.reading_service.add(user.user_id(), request).await?;
    Ok((StatusCode::CREATED, Json(reading)))
}

/// DELETE /readings/{id}
pub async fn remove_reading(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.reading_service.remove(user.user_id(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
