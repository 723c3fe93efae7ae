//! Version history service
//!
//! Checkpoint metadata management for the admin area. This service only
//! tracks which checkpoint is flagged as current; restoring site content to
//! a checkpoint is performed by an external tool, and nothing here attempts
//! it.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::CheckpointRepository;
use crate::models::Checkpoint;

/// Error types for version history operations
#[derive(Debug, thiserror::Error)]
pub enum VersionHistoryError {
    #[error("Checkpoint not found: {0}")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Version history service
pub struct VersionHistoryService {
    repo: Arc<dyn CheckpointRepository>,
}

impl VersionHistoryService {
    pub fn new(repo: Arc<dyn CheckpointRepository>) -> Self {
        Self { repo }
    }

    /// Create a checkpoint record
    pub async fn create(
        &self,
        label: &str,
        description: &str,
    ) -> Result<Checkpoint, VersionHistoryError> {
        if label.trim().is_empty() {
            return Err(VersionHistoryError::ValidationError(
                "Label is required".into(),
            ));
        }
        Ok(self
            .repo
            .create(label.trim(), description)
            .await
            .context("Failed to create checkpoint")?)
    }

    /// List all checkpoints, newest first
    pub async fn list_all(&self) -> Result<Vec<Checkpoint>, VersionHistoryError> {
        Ok(self
            .repo
            .list_all()
            .await
            .context("Failed to list checkpoints")?)
    }

    /// Flag one checkpoint as current. This updates metadata only.
    pub async fn mark_as_current(&self, id: i64) -> Result<Checkpoint, VersionHistoryError> {
        let marked = self
            .repo
            .mark_as_current(id)
            .await
            .context("Failed to mark checkpoint")?;
        if !marked {
            return Err(VersionHistoryError::NotFound(id));
        }

        self.repo
            .get_by_id(id)
            .await
            .context("Failed to re-fetch checkpoint")?
            .ok_or(VersionHistoryError::NotFound(id))
    }

    /// Delete a checkpoint record
    pub async fn delete(&self, id: i64) -> Result<(), VersionHistoryError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete checkpoint")?;
        if !deleted {
            return Err(VersionHistoryError::NotFound(id));
        }
        Ok(())
    }
}
