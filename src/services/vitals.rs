//! Core Web Vitals service
//!
//! Fire-and-forget metric ingestion plus p75 summaries for the admin
//! dashboard. p75 is the percentile the field tooling reports, so it is
//! what we surface.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::VitalsRepository;
use crate::models::{VitalsReport, VitalsSummary};

/// Metric names accepted from the browser
const KNOWN_METRICS: &[&str] = &["LCP", "CLS", "INP", "FCP", "TTFB"];

/// Error types for vitals operations
#[derive(Debug, thiserror::Error)]
pub enum VitalsError {
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Vitals service
pub struct VitalsService {
    repo: Arc<dyn VitalsRepository>,
}

impl VitalsService {
    pub fn new(repo: Arc<dyn VitalsRepository>) -> Self {
        Self { repo }
    }

    /// Store one reported sample. Unknown metric names are rejected so a
    /// misbehaving client cannot grow the table unboundedly per name.
    pub async fn record(&self, report: VitalsReport) -> Result<(), VitalsError> {
        if !KNOWN_METRICS.contains(&report.metric.as_str()) {
            return Err(VitalsError::UnknownMetric(report.metric));
        }
        self.repo
            .record(&report)
            .await
            .context("Failed to store vitals sample")?;
        Ok(())
    }

    /// Per-metric summaries with p75 values
    pub async fn summaries(&self) -> Result<Vec<VitalsSummary>, VitalsError> {
        let aggregates = self
            .repo
            .aggregates()
            .await
            .context("Failed to aggregate vitals")?;

        let mut summaries = Vec::with_capacity(aggregates.len());
        for aggregate in aggregates {
            let values = self
                .repo
                .metric_values(&aggregate.metric)
                .await
                .context("Failed to fetch metric values")?;
            summaries.push(VitalsSummary {
                metric: aggregate.metric,
                samples: aggregate.samples,
                p75: percentile(&values, 0.75),
                latest_at: aggregate.latest_at,
            });
        }
        Ok(summaries)
    }
}

/// Nearest-rank percentile over ascending values; 0.0 for empty input
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((sorted.len() as f64) * p).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxVitalsRepository;
    use crate::db::{create_test_pool, migrations};

    async fn service() -> VitalsService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        VitalsService::new(Arc::new(SqlxVitalsRepository::new(pool)))
    }

    #[tokio::test]
    async fn unknown_metric_rejected() {
        let service = service().await;
        let err = service
            .record(VitalsReport {
                metric: "FPS".into(),
                value: 60.0,
                page: "/".into(),
            })
            .await;
        assert!(matches!(err, Err(VitalsError::UnknownMetric(_))));
    }

    #[tokio::test]
    async fn summaries_report_p75() {
        let service = service().await;
        for value in [100.0, 200.0, 300.0, 400.0] {
            service
                .record(VitalsReport {
                    metric: "LCP".into(),
                    value,
                    page: "/".into(),
                })
                .await
                .unwrap();
        }

        let summaries = service.summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].samples, 4);
        assert_eq!(summaries[0].p75, 300.0);
    }

    #[test]
    fn percentile_nearest_rank() {
        assert_eq!(percentile(&[], 0.75), 0.0);
        assert_eq!(percentile(&[10.0], 0.75), 10.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 1.0), 4.0);
    }
}
