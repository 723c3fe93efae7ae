//! Content checkpoint model
//!
//! Checkpoints are version-history metadata rows. Marking one as current
//! only flips a flag; restoring the content itself is done with an external
//! tool, never from this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content version checkpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unique identifier
    pub id: i64,
    /// Short human-readable label
    pub label: String,
    /// Free-form description of what changed
    pub description: String,
    /// Whether this checkpoint is flagged as the current one
    pub is_current: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
