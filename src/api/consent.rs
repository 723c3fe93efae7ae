//! Cookie-consent API endpoints
//!
//! The consent store with explicit get/set/clear operations:
//! - GET /api/v1/consent/:visitor_id - Current decision (null = show banner)
//! - PUT /api/v1/consent/:visitor_id - Record a decision
//! - DELETE /api/v1/consent/:visitor_id - Forget the decision

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::services::consent::{ConsentError, ConsentState};

impl From<ConsentError> for ApiError {
    fn from(e: ConsentError) -> Self {
        match e {
            ConsentError::InvalidVisitorId(id) => {
                ApiError::validation_error(format!("Invalid visitor id: {}", id))
            }
            ConsentError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Wire format for a consent decision
#[derive(Debug, Serialize, Deserialize)]
pub struct ConsentBody {
    /// "accepted" | "declined"; absent when no decision is recorded
    pub state: Option<ConsentState>,
}

/// Public consent routes
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{visitor_id}",
        get(get_consent).put(set_consent).delete(clear_consent),
    )
}

/// GET /api/v1/consent/:visitor_id
async fn get_consent(
    State(state): State<AppState>,
    Path(visitor_id): Path<String>,
) -> Result<Json<ConsentBody>, ApiError> {
    let decision = state.consent_store.get(&visitor_id).await?;
    Ok(Json(ConsentBody { state: decision }))
}

/// PUT /api/v1/consent/:visitor_id
async fn set_consent(
    State(state): State<AppState>,
    Path(visitor_id): Path<String>,
    Json(body): Json<ConsentBody>,
) -> Result<StatusCode, ApiError> {
    let Some(decision) = body.state else {
        return Err(ApiError::validation_error(
            "state must be 'accepted' or 'declined'",
        ));
    };
    state.consent_store.set(&visitor_id, decision).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/consent/:visitor_id
async fn clear_consent(
    State(state): State<AppState>,
    Path(visitor_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.consent_store.clear(&visitor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
