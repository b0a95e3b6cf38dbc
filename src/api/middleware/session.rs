//! Session resolution and the page route guard.
//!
//! Every guarded request is resolved to an `AuthContext` (a guest when no
//! valid session is present) which handlers pick up from the request
//! extensions. The same middleware then applies the route access policy
//! and answers with a temporary redirect when it says so.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::config::{BEARER_TOKEN_PREFIX, SESSION_COOKIE};
use crate::errors::AppError;
use crate::policy::{AuthContext, RouteAccessPolicy, RouteDecision};
use crate::services::AuthService;

/// State needed to resolve sessions and guard routes.
#[derive(Clone)]
pub struct SessionState {
    pub auth: Arc<dyn AuthService>,
    pub policy: Arc<RouteAccessPolicy>,
}

/// Session token from the `session` cookie, else from a bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(|token| token.trim().to_string())
}

/// Resolve the caller. The token only proves who the caller is; the role
/// is read from the user record, so provisioning changes and deletions
/// take effect on the next request. Invalid tokens and vanished users
/// make a guest.
pub async fn resolve_context(auth: &dyn AuthService, headers: &HeaderMap) -> AuthContext {
    let Some(token) = session_token(headers) else {
        return AuthContext::guest();
    };

    let claims = match auth.verify_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
            return AuthContext::guest();
        }
    };

    match auth.current_user(claims.sub).await {
        Ok(user) => AuthContext::user(user.id, user.role),
        Err(AppError::NotFound) => {
            tracing::info!(user_id = %claims.sub, "Session of a removed user");
            AuthContext::guest()
        }
        Err(e) => {
            tracing::warn!(user_id = %claims.sub, error = %e, "Could not load session user");
            AuthContext::guest()
        }
    }
}

/// Route guard middleware.
pub async fn route_guard(
    State(state): State<SessionState>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = resolve_context(state.auth.as_ref(), request.headers()).await;
    let path = request.uri().path().to_string();

    match state.policy.decide(&path, context.role) {
        RouteDecision::Redirect(to) => {
            tracing::debug!(path = %path, to = %to, role = ?context.role, "Redirecting");
            Redirect::temporary(&to).into_response()
        }
        RouteDecision::PassThrough => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
    }
}
