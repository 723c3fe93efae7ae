//! Core Web Vitals model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Core Web Vitals metric reported by the browser, fire-and-forget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsReport {
    /// Metric name: LCP, CLS, INP, FCP or TTFB
    pub metric: String,
    /// Metric value (milliseconds, or unitless for CLS)
    pub value: f64,
    /// Page path the metric was measured on
    #[serde(default)]
    pub page: String,
}

/// Aggregated view of one metric for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsSummary {
    pub metric: String,
    pub samples: i64,
    pub p75: f64,
    pub latest_at: Option<DateTime<Utc>>,
}
