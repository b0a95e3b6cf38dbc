//! Identity provider - registration, login, email verification and
//! session tokens.
//!
//! Passwords are hashed by the domain `Password` value object; sessions are
//! HS256 JWTs signed with `AUTH_SECRET`.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::mailer::Mailer;
use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User, UserRole, VerificationToken};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::validation::{validate, LoginRequest, RegisterRequest};

pub const REGISTERED: &str =
    "Confirmation email sent Check your inbox to verify your email and login!";
pub const LOGGED_IN: &str = "Login successful!";
pub const VERIFICATION_RESENT: &str = "Email not verified. Check your inbox and verify!";
pub const EMAIL_VERIFIED: &str = "Email verified!";

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Result of a well-formed login attempt.
#[derive(Debug)]
pub enum LoginOutcome {
    SignedIn(TokenResponse),
    /// Email not verified yet; a fresh link was dispatched, no session.
    VerificationSent,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validate a registration form and create a pending user.
    async fn register(&self, input: Value) -> AppResult<User>;

    /// Validate a login form and sign the user in.
    async fn login(&self, input: Value) -> AppResult<LoginOutcome>;

    /// Consume an email verification token.
    async fn verify_email(&self, token: &str) -> AppResult<User>;

    /// The signed-in user's record.
    async fn current_user(&self, user_id: Uuid) -> AppResult<User>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for a user
fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.session_expiration_hours);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.auth_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.session_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Arc<dyn Mailer>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self {
            uow,
            mailer,
            config,
        }
    }

    /// Issue a fresh token for `email` and hand it to the mailer.
    /// Mail failures are logged; the user can trigger a resend by logging in.
    async fn dispatch_verification(&self, email: &str) -> AppResult<()> {
        let token = self
            .uow
            .tokens()
            .replace(&VerificationToken::issue(email))
            .await?;

        if let Err(e) = self.mailer.send_verification(&token.email, &token.token).await {
            tracing::error!(email = %email, error = %e, "Failed to dispatch verification email");
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: Value) -> AppResult<User> {
        let registration = validate::<RegisterRequest>(input)?;
        let users = self.uow.users();

        if users.find_by_username(&registration.username).await?.is_some() {
            return Err(AppError::conflict("Username already taken!"));
        }
        if users.find_by_email(&registration.email).await?.is_some() {
            return Err(AppError::conflict("Email already in use!"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let user = users.create(&User::register(&registration, password_hash)).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        self.dispatch_verification(&user.email).await?;

        Ok(user)
    }

    async fn login(&self, input: Value) -> AppResult<LoginOutcome> {
        let credentials = validate::<LoginRequest>(input)?;

        let Some(user) = self.uow.users().find_by_username(&credentials.username).await? else {
            // Burn the same hashing time as a real check.
            Password::dummy().verify(&credentials.password);
            return Err(AppError::InvalidCredentials);
        };

        if !user.is_verified() {
            tracing::info!(user_id = %user.id, "Login before email verification");
            self.dispatch_verification(&user.email).await?;
            return Ok(LoginOutcome::VerificationSent);
        }

        if !Password::from_hash(user.password_hash.as_str()).verify(&credentials.password) {
            tracing::warn!(user_id = %user.id, "Invalid password");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User signed in");
        generate_token(&user, &self.config).map(LoginOutcome::SignedIn)
    }

    async fn verify_email(&self, token: &str) -> AppResult<User> {
        let tokens = self.uow.tokens();
        let stored = tokens
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::bad_request("Token does not exist!"))?;

        if stored.is_expired(Utc::now()) {
            return Err(AppError::bad_request("Token has expired!"));
        }

        let users = self.uow.users();
        let mut user = users
            .find_by_email(&stored.email)
            .await?
            .ok_or_else(|| AppError::bad_request("Email does not exist!"))?;

        user.mark_verified(Utc::now());
        let user = users.save(&user).await?;
        tokens.delete(&stored).await?;

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    async fn current_user(&self, user_id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(user_id).await?.ok_or_not_found()
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.auth_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockTokenRepository, MockUserRepository, TokenRepository, UserRepository};
    use crate::services::mailer::MockMailer;
    use serde_json::json;

    struct MockUow {
        users: Arc<MockUserRepository>,
        tokens: Arc<MockTokenRepository>,
    }

    impl UnitOfWork for MockUow {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.users.clone()
        }

        fn tokens(&self) -> Arc<dyn TokenRepository> {
            self.tokens.clone()
        }
    }

    fn authenticator(
        users: MockUserRepository,
        tokens: MockTokenRepository,
        mailer: MockMailer,
    ) -> Authenticator<MockUow> {
        let uow = Arc::new(MockUow {
            users: Arc::new(users),
            tokens: Arc::new(tokens),
        });
        Authenticator::new(
            uow,
            Arc::new(mailer),
            Config::with_secret("test-secret-key-minimum-32-chars!!"),
        )
    }

    fn registration_form() -> Value {
        json!({
            "username": "alice",
            "firstname": "Alice",
            "lastname": "Doe",
            "phone": "+447911123456",
            "country": "GB",
            "metamask": "0xabc",
            "autotrade": "alice-auto",
            "email": "alice@example.com",
            "password": "secret1",
            "confirmPassword": "secret1"
        })
    }

    #[tokio::test]
    async fn duplicate_username_creates_nothing() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| {
            let form = validate::<RegisterRequest>(registration_form()).unwrap();
            Ok(Some(User::register(&form, "hash".into())))
        });
        users.expect_create().never();
        let mut mailer = MockMailer::new();
        mailer.expect_send_verification().never();

        let auth = authenticator(users, MockTokenRepository::new(), mailer);
        let err = auth.register(registration_form()).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref m) if m == "Username already taken!"));
    }

    #[tokio::test]
    async fn register_queues_verification_for_new_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|u| !u.approved && !u.is_verified() && u.password_hash != "secret1")
            .returning(|u| Ok(u.clone()));

        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_replace()
            .withf(|t| t.email == "alice@example.com")
            .returning(|t| Ok(t.clone()));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send_verification()
            .times(1)
            .returning(|_, _| Ok(()));

        let auth = authenticator(users, tokens, mailer);
        let user = auth.register(registration_form()).await.unwrap();

        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn unknown_username_is_invalid_credentials() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));

        let auth = authenticator(users, MockTokenRepository::new(), MockMailer::new());
        let err = auth
            .login(json!({ "username": "nobody", "password": "secret1" }))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn verified_user_gets_a_session_that_verifies() {
        let form = validate::<RegisterRequest>(registration_form()).unwrap();
        let mut user = User::register(
            &form,
            Password::new("secret1").unwrap().into_string(),
        );
        user.mark_verified(Utc::now());

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(users, MockTokenRepository::new(), MockMailer::new());
        let outcome = auth
            .login(json!({ "username": "Alice", "password": "secret1" }))
            .await
            .unwrap();

        let LoginOutcome::SignedIn(token) = outcome else {
            panic!("expected a session");
        };
        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role(), UserRole::User);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let mut stale = VerificationToken::issue("alice@example.com");
        stale.expires_at = Utc::now() - Duration::minutes(1);

        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_find_by_token()
            .returning(move |_| Ok(Some(stale.clone())));
        let mut users = MockUserRepository::new();
        users.expect_save().never();

        let auth = authenticator(users, tokens, MockMailer::new());
        let err = auth.verify_email("stale").await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Token has expired!"));
    }

    #[test]
    fn tampered_token_fails_verification() {
        let auth = authenticator(
            MockUserRepository::new(),
            MockTokenRepository::new(),
            MockMailer::new(),
        );
        assert!(auth.verify_token("not.a.jwt").is_err());
    }
}
