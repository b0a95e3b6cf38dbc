//! Email background job.
//!
//! Jobs are queued by the mailer and drained by `jobs work`. Delivery is
//! out of scope: the worker records each message in the log.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Sender used when `MAIL_FROM` is not set
const DEFAULT_MAIL_FROM: &str = "noreply@localhost";

/// Email job payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Recipient email address
    pub to: String,
    /// Email subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Optional sender override
    #[serde(default)]
    pub from: Option<String>,
}

impl EmailJob {
    /// Create a new email job
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            from: None,
        }
    }
}

/// Email job handler
pub async fn email_job_handler(job: EmailJob) -> Result<(), AppError> {
    if job.to.trim().is_empty() {
        return Err(AppError::bad_request("Email job has no recipient"));
    }

    let from = job
        .from
        .clone()
        .or_else(|| std::env::var("MAIL_FROM").ok())
        .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());

    tracing::info!(
        to = %job.to,
        from = %from,
        subject = %job.subject,
        "Processing email job"
    );
    tracing::info!(
        "=== EMAIL ===\nFrom: {}\nTo: {}\nSubject: {}\n\n{}\n=============",
        from,
        job.to,
        job.subject,
        job.body
    );

    Ok(())
}
