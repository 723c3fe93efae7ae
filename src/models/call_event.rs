//! Call-tracking model
//!
//! Records call-button clicks per service-area page so the admin dashboard
//! can see which locations generate phone enquiries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single call-button click
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEvent {
    /// Unique identifier
    pub id: i64,
    /// Location slug the click was attributed to
    pub location: String,
    /// Path of the page the button lived on
    pub source_page: String,
    /// Click timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for recording a call-button click
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCallInput {
    pub location: String,
    #[serde(default)]
    pub source_page: String,
}

/// Aggregated call counts for one location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCallStats {
    pub location: String,
    pub total_calls: i64,
    /// Timestamp of the most recent click, if any
    pub last_call_at: Option<DateTime<Utc>>,
}
