//! Version history API endpoints (admin)
//!
//! - GET /api/v1/admin/versions - List checkpoints
//! - POST /api/v1/admin/versions - Create a checkpoint record
//! - POST /api/v1/admin/versions/:id/current - Flag a checkpoint as current
//! - DELETE /api/v1/admin/versions/:id - Delete a checkpoint
//!
//! Flagging a checkpoint updates metadata only; restoring content to a
//! checkpoint happens through an external tool.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::Checkpoint;
use crate::services::version_history::VersionHistoryError;

impl From<VersionHistoryError> for ApiError {
    fn from(e: VersionHistoryError) -> Self {
        match e {
            VersionHistoryError::NotFound(id) => {
                ApiError::not_found(format!("Checkpoint not found: {}", id))
            }
            VersionHistoryError::ValidationError(msg) => ApiError::validation_error(msg),
            VersionHistoryError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Request body for creating a checkpoint
#[derive(Debug, Deserialize)]
pub struct CreateCheckpointRequest {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// Response for the checkpoint list
#[derive(Debug, Serialize)]
pub struct CheckpointListResponse {
    pub checkpoints: Vec<Checkpoint>,
}

/// Admin version-history routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_checkpoints).post(create_checkpoint))
        .route("/{id}/current", post(mark_as_current))
        .route("/{id}", axum::routing::delete(delete_checkpoint))
}

/// GET /api/v1/admin/versions
async fn list_checkpoints(
    State(state): State<AppState>,
) -> Result<Json<CheckpointListResponse>, ApiError> {
    let checkpoints = state.version_history.list_all().await?;
    Ok(Json(CheckpointListResponse { checkpoints }))
}

/// POST /api/v1/admin/versions
async fn create_checkpoint(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckpointRequest>,
) -> Result<(StatusCode, Json<Checkpoint>), ApiError> {
    let checkpoint = state
        .version_history
        .create(&request.label, &request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(checkpoint)))
}

/// POST /api/v1/admin/versions/:id/current
async fn mark_as_current(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Checkpoint>, ApiError> {
    let checkpoint = state.version_history.mark_as_current(id).await?;
    Ok(Json(checkpoint))
}

/// DELETE /api/v1/admin/versions/:id
async fn delete_checkpoint(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.version_history.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
