//! Cookie-consent store
//!
//! An explicit store for visitor consent decisions with get/set/clear
//! operations, initialized once at startup and injected where needed, in
//! place of ad hoc global storage access. Decisions are keyed per visitor
//! id under a single settings-key namespace.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::repositories::SettingsRepository;

/// Settings-key namespace for consent decisions
const CONSENT_KEY_PREFIX: &str = "csb_cookie_consent:";

/// A visitor's recorded consent decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentState {
    Accepted,
    Declined,
}

impl ConsentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentState::Accepted => "accepted",
            ConsentState::Declined => "declined",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(ConsentState::Accepted),
            "declined" => Some(ConsentState::Declined),
            _ => None,
        }
    }
}

/// Error types for consent operations
#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    #[error("Invalid visitor id: {0}")]
    InvalidVisitorId(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Consent store over the settings repository
pub struct ConsentStore {
    repo: Arc<dyn SettingsRepository>,
}

impl ConsentStore {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Get a visitor's decision; None means the banner should be shown
    pub async fn get(&self, visitor_id: &str) -> Result<Option<ConsentState>, ConsentError> {
        let key = self.key(visitor_id)?;
        let setting = self
            .repo
            .get(&key)
            .await
            .context("Failed to read consent")?;
        Ok(setting.and_then(|s| ConsentState::from_str(&s.value)))
    }

    /// Record a visitor's decision
    pub async fn set(&self, visitor_id: &str, state: ConsentState) -> Result<(), ConsentError> {
        let key = self.key(visitor_id)?;
        self.repo
            .set(&key, state.as_str())
            .await
            .context("Failed to store consent")?;
        Ok(())
    }

    /// Forget a visitor's decision; the banner shows again
    pub async fn clear(&self, visitor_id: &str) -> Result<(), ConsentError> {
        let key = self.key(visitor_id)?;
        self.repo
            .delete(&key)
            .await
            .context("Failed to clear consent")?;
        Ok(())
    }

    /// Visitor ids are opaque tokens; reject anything empty or outlandish
    fn key(&self, visitor_id: &str) -> Result<String, ConsentError> {
        let id = visitor_id.trim();
        if id.is_empty()
            || id.len() > 128
            || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConsentError::InvalidVisitorId(visitor_id.to_string()));
        }
        Ok(format!("{}{}", CONSENT_KEY_PREFIX, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSettingsRepository;
    use crate::db::{create_test_pool, migrations};

    async fn store() -> ConsentStore {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        ConsentStore::new(Arc::new(SqlxSettingsRepository::new(pool)))
    }

    #[tokio::test]
    async fn unset_visitor_has_no_decision() {
        let store = store().await;
        assert_eq!(store.get("visitor-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_get_clear_roundtrip() {
        let store = store().await;

        store.set("visitor-1", ConsentState::Accepted).await.unwrap();
        assert_eq!(
            store.get("visitor-1").await.unwrap(),
            Some(ConsentState::Accepted)
        );

        store.set("visitor-1", ConsentState::Declined).await.unwrap();
        assert_eq!(
            store.get("visitor-1").await.unwrap(),
            Some(ConsentState::Declined)
        );

        store.clear("visitor-1").await.unwrap();
        assert_eq!(store.get("visitor-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn decisions_are_per_visitor() {
        let store = store().await;
        store.set("a", ConsentState::Accepted).await.unwrap();
        store.set("b", ConsentState::Declined).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(ConsentState::Accepted));
        assert_eq!(store.get("b").await.unwrap(), Some(ConsentState::Declined));
    }

    #[tokio::test]
    async fn invalid_visitor_ids_rejected() {
        let store = store().await;
        let too_long = "x".repeat(200);
        for id in ["", "  ", "has space", "semi;colon", too_long.as_str()] {
            assert!(matches!(
                store.get(id).await,
                Err(ConsentError::InvalidVisitorId(_))
            ));
        }
    }
}
