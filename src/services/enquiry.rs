//! Quote enquiry service
//!
//! Validates and persists quote enquiries, then hands accepted ones to the
//! mailer for the office notification. Validation failures never reach the
//! database.

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::db::repositories::EnquiryRepository;
use crate::models::{Enquiry, NewEnquiry};
use crate::services::email::EnquiryMailer;

/// Permissive email shape check: something@something.something
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Error types for enquiry operations
#[derive(Debug, thiserror::Error)]
pub enum EnquiryServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Enquiry service
pub struct EnquiryService {
    repo: Arc<dyn EnquiryRepository>,
    mailer: Option<Arc<EnquiryMailer>>,
}

impl EnquiryService {
    pub fn new(repo: Arc<dyn EnquiryRepository>) -> Self {
        Self { repo, mailer: None }
    }

    /// Attach a mailer so accepted enquiries trigger an office notification
    pub fn with_mailer(mut self, mailer: Arc<EnquiryMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Validate and persist one enquiry.
    ///
    /// The notification email is fire-and-forget: a mail failure is logged
    /// and does not fail the submission, which is already stored.
    pub async fn submit(&self, input: NewEnquiry) -> Result<Enquiry, EnquiryServiceError> {
        validate(&input)?;

        let enquiry = self
            .repo
            .create(&input)
            .await
            .context("Failed to store enquiry")?;

        if let Some(mailer) = &self.mailer {
            let mailer = mailer.clone();
            let notify = enquiry.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer.send_enquiry_notification(&notify).await {
                    tracing::warn!("Enquiry notification email failed: {}", e);
                }
            });
        }

        Ok(enquiry)
    }

    /// List enquiries for the admin area
    pub async fn list(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Enquiry>, i64), EnquiryServiceError> {
        Ok(self
            .repo
            .list(page, page_size)
            .await
            .context("Failed to list enquiries")?)
    }

    /// Delete an enquiry
    pub async fn delete(&self, id: i64) -> Result<bool, EnquiryServiceError> {
        Ok(self
            .repo
            .delete(id)
            .await
            .context("Failed to delete enquiry")?)
    }
}

fn validate(input: &NewEnquiry) -> Result<(), EnquiryServiceError> {
    if input.name.trim().is_empty() {
        return Err(EnquiryServiceError::ValidationError(
            "Name is required".into(),
        ));
    }
    if input.message.trim().is_empty() {
        return Err(EnquiryServiceError::ValidationError(
            "Message is required".into(),
        ));
    }
    if !EMAIL_RE.is_match(input.email.trim()) {
        return Err(EnquiryServiceError::ValidationError(format!(
            "Invalid email address: '{}'",
            input.email
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxEnquiryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn service() -> EnquiryService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        EnquiryService::new(Arc::new(SqlxEnquiryRepository::new(pool)))
    }

    fn valid() -> NewEnquiry {
        NewEnquiry {
            name: "Sam Ellis".into(),
            email: "sam@example.co.uk".into(),
            phone: None,
            message: "Need a skip of wheels blasting and priming.".into(),
        }
    }

    #[tokio::test]
    async fn valid_enquiry_is_stored() {
        let service = service().await;
        let enquiry = service.submit(valid()).await.unwrap();
        assert!(enquiry.id > 0);

        let (list, total) = service.list(1, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(list[0].name, "Sam Ellis");
    }

    #[tokio::test]
    async fn empty_message_rejected_before_persistence() {
        let service = service().await;
        let mut input = valid();
        input.message = "   ".into();

        let err = service.submit(input).await;
        assert!(matches!(err, Err(EnquiryServiceError::ValidationError(_))));

        let (_, total) = service.list(1, 10).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn empty_name_rejected() {
        let service = service().await;
        let mut input = valid();
        input.name = String::new();
        assert!(matches!(
            service.submit(input).await,
            Err(EnquiryServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn bad_email_rejected() {
        let service = service().await;
        for email in ["", "plainaddress", "no@tld", "two@@ats.com", "sp ace@x.com"] {
            let mut input = valid();
            input.email = email.into();
            assert!(
                matches!(
                    service.submit(input).await,
                    Err(EnquiryServiceError::ValidationError(_))
                ),
                "email '{}' should be rejected",
                email
            );
        }
    }
}
