//! Gallery project model
//!
//! A gallery project is a before/after image pair for one completed job,
//! rendered with the comparison slider on the gallery page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A before/after project shown in the photo gallery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryProject {
    /// Unique identifier
    pub id: i64,
    /// Project title, e.g. "Cast-iron gates, Stockport"
    pub title: String,
    /// URL of the pre-treatment image
    pub before_url: String,
    /// URL of the post-treatment image
    pub after_url: String,
    /// Optional WebP thumbnail of the after image
    pub thumbnail_url: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a gallery project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGalleryProject {
    pub title: String,
    pub before_url: String,
    pub after_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}
