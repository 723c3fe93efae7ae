//! Contact API endpoints
//!
//! - POST /api/v1/contact - Submit a quote enquiry
//! - GET /api/v1/admin/enquiries - List enquiries (admin)
//! - DELETE /api/v1/admin/enquiries/:id - Delete an enquiry (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{Enquiry, NewEnquiry};
use crate::services::enquiry::EnquiryServiceError;

impl From<EnquiryServiceError> for ApiError {
    fn from(e: EnquiryServiceError) -> Self {
        match e {
            EnquiryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            EnquiryServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Response after a successful submission
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: i64,
    pub received_at: String,
}

/// Response for the admin enquiry list
#[derive(Debug, Serialize)]
pub struct EnquiryListResponse {
    pub enquiries: Vec<Enquiry>,
    pub total: i64,
}

/// Public contact routes
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_enquiry))
}

/// Admin enquiry routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_enquiries))
        .route("/{id}", axum::routing::delete(delete_enquiry))
}

/// POST /api/v1/contact
async fn submit_enquiry(
    State(state): State<AppState>,
    Json(input): Json<NewEnquiry>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let enquiry = state.enquiry_service.submit(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: enquiry.id,
            received_at: enquiry.created_at.to_rfc3339(),
        }),
    ))
}

/// GET /api/v1/admin/enquiries
async fn list_enquiries(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<EnquiryListResponse>, ApiError> {
    let (enquiries, total) = state
        .enquiry_service
        .list(query.page.max(1), query.page_size.clamp(1, 100))
        .await?;
    Ok(Json(EnquiryListResponse { enquiries, total }))
}

/// DELETE /api/v1/admin/enquiries/:id
async fn delete_enquiry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.enquiry_service.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Enquiry not found: {}", id)))
    }
}
