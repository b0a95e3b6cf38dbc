//! Outgoing mail - verification links are queued, never sent inline.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;

use crate::config::VERIFICATION_PATH;
use crate::errors::{AppError, AppResult};
use crate::jobs::EmailJob;

#[cfg(test)]
use mockall::automock;

/// Email sender collaborator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Dispatch an email-verification link for `token` to `email`.
    async fn send_verification(&self, email: &str, token: &str) -> AppResult<()>;
}

/// Build the verification email for a token.
pub fn verification_email(app_url: &str, email: &str, token: &str) -> EmailJob {
    let link = format!(
        "{}{}?token={}",
        app_url.trim_end_matches('/'),
        VERIFICATION_PATH,
        token
    );

    EmailJob::new(
        email,
        "Confirm your email",
        format!("Click the link below to confirm your email:\n\n{}\n", link),
    )
}

/// Mailer that pushes jobs onto the apalis Postgres queue.
pub struct JobMailer {
    storage: PostgresStorage<EmailJob>,
    app_url: String,
}

impl JobMailer {
    pub fn new(storage: PostgresStorage<EmailJob>, app_url: impl Into<String>) -> Self {
        Self {
            storage,
            app_url: app_url.into(),
        }
    }
}

#[async_trait]
impl Mailer for JobMailer {
    async fn send_verification(&self, email: &str, token: &str) -> AppResult<()> {
        let job = verification_email(&self.app_url, email, token);
        let mut storage = self.storage.clone();

        storage
            .push(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to queue email: {}", e)))?;

        tracing::info!(to = %email, "Verification email queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_link_points_at_verification_page() {
        let job = verification_email("http://localhost:3000/", "alice@example.com", "abc-123");

        assert_eq!(job.to, "alice@example.com");
        assert!(job
            .body
            .contains("http://localhost:3000/auth/new-verification?token=abc-123"));
    }
}
