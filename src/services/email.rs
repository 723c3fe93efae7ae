//! Email service for enquiry notifications
//!
//! SMTP settings live in the settings repository so the admin can change
//! them without a redeploy. When no SMTP host is configured the mailer
//! reports itself disabled and sending is skipped.

use anyhow::{anyhow, Result};
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

use crate::db::repositories::SettingsRepository;
use crate::models::Enquiry;

/// Mailer for quote-enquiry notifications
pub struct EnquiryMailer {
    settings_repo: Arc<dyn SettingsRepository>,
}

impl EnquiryMailer {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    /// Whether SMTP is configured at all
    pub async fn is_configured(&self) -> bool {
        matches!(
            self.settings_repo.get("smtp_host").await,
            Ok(Some(s)) if !s.value.is_empty()
        )
    }

    async fn get_setting(&self, key: &str) -> Result<String> {
        let setting = self
            .settings_repo
            .get(key)
            .await?
            .ok_or_else(|| anyhow!("Setting '{}' not configured", key))?;
        Ok(setting.value)
    }

    /// Send the office notification for one accepted enquiry
    pub async fn send_enquiry_notification(&self, enquiry: &Enquiry) -> Result<()> {
        let smtp_host = self.get_setting("smtp_host").await?;
        if smtp_host.is_empty() {
            return Err(anyhow!("SMTP host not configured"));
        }

        let smtp_port: u16 = self
            .get_setting("smtp_port")
            .await
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .unwrap_or(587);
        let smtp_username = self.get_setting("smtp_username").await?;
        let smtp_password = self.get_setting("smtp_password").await?;
        let smtp_from = self.get_setting("smtp_from").await?;
        let notify_to = self.get_setting("enquiry_notify_to").await?;

        let phone = enquiry.phone.as_deref().unwrap_or("not given");
        let subject = format!("New quote enquiry from {}", enquiry.name);
        let body = format!(
            "Name: {}\nEmail: {}\nPhone: {}\nReceived: {}\n\n{}\n",
            enquiry.name,
            enquiry.email,
            phone,
            enquiry.created_at.to_rfc3339(),
            enquiry.message,
        );

        let email = Message::builder()
            .from(
                smtp_from
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(notify_to
                .parse()
                .map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let creds = Credentials::new(smtp_username, smtp_password);

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp_host)
                .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
                .credentials(creds)
                .port(smtp_port)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSettingsRepository;
    use crate::db::{create_test_pool, migrations};

    #[tokio::test]
    async fn unconfigured_mailer_reports_disabled() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let repo = Arc::new(SqlxSettingsRepository::new(pool));

        let mailer = EnquiryMailer::new(repo.clone());
        assert!(!mailer.is_configured().await);

        repo.set("smtp_host", "mail.example.co.uk").await.unwrap();
        assert!(mailer.is_configured().await);
    }
}
