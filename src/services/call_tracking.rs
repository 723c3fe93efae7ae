//! Call-tracking service
//!
//! Records call-button clicks and aggregates them for the admin dashboard.
//! Clicks are attributed to a location slug; unknown locations are still
//! recorded so a misconfigured page does not drop data.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::repositories::CallEventRepository;
use crate::models::{CallEvent, LocationCallStats, RecordCallInput};

/// Error types for call-tracking operations
#[derive(Debug, thiserror::Error)]
pub enum CallTrackingError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Dashboard analytics: totals, per-location aggregates, recent activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAnalytics {
    pub total_calls: i64,
    pub locations: Vec<LocationCallStats>,
    pub recent: Vec<CallEvent>,
}

/// Call-tracking service
pub struct CallTrackingService {
    repo: Arc<dyn CallEventRepository>,
}

impl CallTrackingService {
    pub fn new(repo: Arc<dyn CallEventRepository>) -> Self {
        Self { repo }
    }

    /// Record one call-button click
    pub async fn record(&self, input: RecordCallInput) -> Result<CallEvent, CallTrackingError> {
        if input.location.trim().is_empty() {
            return Err(CallTrackingError::ValidationError(
                "Location is required".into(),
            ));
        }

        Ok(self
            .repo
            .record(&input)
            .await
            .context("Failed to record call event")?)
    }

    /// Per-location aggregates for the public stats endpoint
    pub async fn location_stats(&self) -> Result<Vec<LocationCallStats>, CallTrackingError> {
        Ok(self
            .repo
            .location_stats()
            .await
            .context("Failed to aggregate call events")?)
    }

    /// Full analytics view for the admin dashboard
    pub async fn analytics(&self) -> Result<CallAnalytics, CallTrackingError> {
        let total_calls = self
            .repo
            .total()
            .await
            .context("Failed to count call events")?;
        let locations = self
            .repo
            .location_stats()
            .await
            .context("Failed to aggregate call events")?;
        let recent = self
            .repo
            .recent(20)
            .await
            .context("Failed to fetch recent call events")?;

        Ok(CallAnalytics {
            total_calls,
            locations,
            recent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCallEventRepository;
    use crate::db::{create_test_pool, migrations};

    async fn service() -> CallTrackingService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        CallTrackingService::new(Arc::new(SqlxCallEventRepository::new(pool)))
    }

    #[tokio::test]
    async fn empty_location_rejected() {
        let service = service().await;
        let err = service
            .record(RecordCallInput {
                location: "  ".into(),
                source_page: "/".into(),
            })
            .await;
        assert!(matches!(err, Err(CallTrackingError::ValidationError(_))));
    }

    #[tokio::test]
    async fn analytics_combines_totals_and_recents() {
        let service = service().await;
        for location in ["bolton", "bolton", "wigan"] {
            service
                .record(RecordCallInput {
                    location: location.into(),
                    source_page: format!("/areas/{}", location),
                })
                .await
                .unwrap();
        }

        let analytics = service.analytics().await.unwrap();
        assert_eq!(analytics.total_calls, 3);
        assert_eq!(analytics.locations[0].location, "bolton");
        assert_eq!(analytics.locations[0].total_calls, 2);
        assert_eq!(analytics.recent.len(), 3);
    }
}
