//! Core Web Vitals API endpoints
//!
//! - POST /api/v1/vitals - Fire-and-forget metric report (public)
//! - GET /api/v1/admin/vitals - Per-metric p75 summaries (admin)

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{VitalsReport, VitalsSummary};
use crate::services::vitals::VitalsError;

impl From<VitalsError> for ApiError {
    fn from(e: VitalsError) -> Self {
        match e {
            VitalsError::UnknownMetric(name) => {
                ApiError::validation_error(format!("Unknown metric: {}", name))
            }
            VitalsError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Response for the admin summaries
#[derive(Debug, Serialize)]
pub struct VitalsSummaryResponse {
    pub metrics: Vec<VitalsSummary>,
}

/// Public vitals routes
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(report_vitals))
}

/// POST /api/v1/vitals
///
/// Fire-and-forget from the browser's perspective: success carries no body.
async fn report_vitals(
    State(state): State<AppState>,
    Json(report): Json<VitalsReport>,
) -> Result<StatusCode, ApiError> {
    state.vitals_service.record(report).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/vitals
pub async fn summaries(
    State(state): State<AppState>,
) -> Result<Json<VitalsSummaryResponse>, ApiError> {
    let metrics = state.vitals_service.summaries().await?;
    Ok(Json(VitalsSummaryResponse { metrics }))
}
