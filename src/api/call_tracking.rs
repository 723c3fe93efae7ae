//! Call-tracking API endpoints
//!
//! - POST /api/v1/calls - Record a call-button click (public)
//! - GET /api/v1/calls/locations - Per-location aggregates (public)
//! - GET /api/v1/admin/analytics - Full dashboard view (admin)

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{LocationCallStats, RecordCallInput};
use crate::services::call_tracking::{CallAnalytics, CallTrackingError};

impl From<CallTrackingError> for ApiError {
    fn from(e: CallTrackingError) -> Self {
        match e {
            CallTrackingError::ValidationError(msg) => ApiError::validation_error(msg),
            CallTrackingError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Response for GET /calls/locations
#[derive(Debug, Serialize)]
pub struct LocationStatsResponse {
    pub locations: Vec<LocationCallStats>,
}

/// Admin analytics response: call data plus service health counters
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    #[serde(flatten)]
    pub calls: CallAnalytics,
    pub total_requests: u64,
    pub avg_response_time_us: f64,
    pub uptime_seconds: u64,
}

/// Public call-tracking routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_call))
        .route("/locations", get(location_stats))
}

/// POST /api/v1/calls
async fn record_call(
    State(state): State<AppState>,
    Json(input): Json<RecordCallInput>,
) -> Result<StatusCode, ApiError> {
    state.call_tracking.record(input).await?;
    Ok(StatusCode::CREATED)
}

/// GET /api/v1/calls/locations
async fn location_stats(
    State(state): State<AppState>,
) -> Result<Json<LocationStatsResponse>, ApiError> {
    let locations = state.call_tracking.location_stats().await?;
    Ok(Json(LocationStatsResponse { locations }))
}

/// GET /api/v1/admin/analytics
pub async fn analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let calls = state.call_tracking.analytics().await?;
    Ok(Json(AnalyticsResponse {
        calls,
        total_requests: state.request_stats.total_requests(),
        avg_response_time_us: state.request_stats.avg_response_time_us(),
        uptime_seconds: state.request_stats.uptime_seconds(),
    }))
}
