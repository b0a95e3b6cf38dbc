//! Authentication handlers.

use axum::{extract::State, response::Json, routing::post, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::api::extractors::JsonInput;
use crate::api::AppState;
use crate::config::SESSION_COOKIE;
use crate::errors::{AppError, AppResult};
use crate::services::{
    LoginOutcome, TokenResponse, EMAIL_VERIFIED, LOGGED_IN, REGISTERED, VERIFICATION_RESENT,
};
use crate::types::{ActionResponse, Created};
use crate::validation::{LoginRequest, RegisterRequest};

/// Login result; `session` is absent when a verification email was sent instead
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Login successful!")]
    pub success: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<TokenResponse>,
}

/// Email verification request
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyEmailRequest {
    /// Token from the emailed link
    pub token: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify", post(verify_email))
}

/// Pull the verification token out of a JSON body.
pub(crate) fn token_from(input: &Value) -> AppResult<&str> {
    input
        .get("token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing token!"))
}

/// Register a new (pending) user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered, verification email queued", body = ActionResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonInput(input): JsonInput,
) -> AppResult<Created<ActionResponse>> {
    state.auth_service.register(input).await?;
    Ok(Created(ActionResponse::new(REGISTERED)))
}

/// Sign in with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in, or verification email re-sent", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonInput(input): JsonInput,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    match state.auth_service.login(input).await? {
        LoginOutcome::SignedIn(token) => {
            let cookie = Cookie::build((SESSION_COOKIE, token.access_token.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);

            Ok((
                jar.add(cookie),
                Json(LoginResponse {
                    success: LOGGED_IN.to_string(),
                    session: Some(token),
                }),
            ))
        }
        LoginOutcome::VerificationSent => Ok((
            jar,
            Json(LoginResponse {
                success: VERIFICATION_RESENT.to_string(),
                session: None,
            }),
        )),
    }
}

/// Confirm an email address
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = "Authentication",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = ActionResponse),
        (status = 400, description = "Missing, unknown or expired token")
    )
)]
pub async fn verify_email(
    State(state): State<AppState>,
    JsonInput(input): JsonInput,
) -> AppResult<ActionResponse> {
    let token = token_from(&input)?;
    state.auth_service.verify_email(token).await?;
    Ok(ActionResponse::new(EMAIL_VERIFIED))
}
