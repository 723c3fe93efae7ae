//! Quote enquiry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quote/contact enquiry submitted through the site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enquiry {
    /// Unique identifier
    pub id: i64,
    /// Sender name
    pub name: String,
    /// Sender email address
    pub email: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Enquiry body
    pub message: String,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for submitting a new enquiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEnquiry {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}
