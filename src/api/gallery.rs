//! Gallery API endpoints
//!
//! - GET /api/v1/gallery - List before/after projects (public)
//! - POST /api/v1/admin/gallery - Create a project (admin)
//! - DELETE /api/v1/admin/gallery/:id - Delete a project (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{GalleryProject, NewGalleryProject};

/// Response for the project list
#[derive(Debug, Serialize)]
pub struct GalleryListResponse {
    pub projects: Vec<GalleryProject>,
}

/// Public gallery routes
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_projects))
}

/// Admin gallery routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_project))
        .route("/{id}", axum::routing::delete(delete_project))
}

/// GET /api/v1/gallery
async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<GalleryListResponse>, ApiError> {
    let projects = state
        .gallery_repo
        .list_all()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(Json(GalleryListResponse { projects }))
}

/// POST /api/v1/admin/gallery
async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<NewGalleryProject>,
) -> Result<(StatusCode, Json<GalleryProject>), ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::validation_error("Title is required"));
    }
    if input.before_url.trim().is_empty() || input.after_url.trim().is_empty() {
        return Err(ApiError::validation_error(
            "Both before and after image URLs are required",
        ));
    }

    let project = state
        .gallery_repo
        .create(&input)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// DELETE /api/v1/admin/gallery/:id
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .gallery_repo
        .delete(id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Project not found: {}", id)))
    }
}
