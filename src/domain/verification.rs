//! Email verification tokens.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::VERIFICATION_TOKEN_TTL_MINUTES;

/// Single-use token proving ownership of an email address.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationToken {
    pub id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl VerificationToken {
    pub fn issue(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + Duration::minutes(VERIFICATION_TOKEN_TTL_MINUTES),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_expires_after_ttl() {
        let token = VerificationToken::issue("alice@example.com");
        let now = Utc::now();

        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::minutes(VERIFICATION_TOKEN_TTL_MINUTES + 1)));
        assert_ne!(token.token, token.id.to_string());
    }
}
