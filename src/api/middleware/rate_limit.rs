//! Fixed-window rate limiting backed by Redis counters.
//!
//! The auth endpoints get a tighter budget than the rest of the API since
//! they are the brute-force surface. Redis being unavailable fails closed.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::net::SocketAddr;

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS, RATE_LIMIT_REQUESTS,
    RATE_LIMIT_WINDOW_SECONDS,
};

/// A request budget for one class of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Counter key namespace
    pub scope: &'static str,
    pub requests: u64,
    pub window_seconds: u64,
}

impl RateLimit {
    pub const GENERAL: RateLimit = RateLimit {
        scope: "general",
        requests: RATE_LIMIT_REQUESTS,
        window_seconds: RATE_LIMIT_WINDOW_SECONDS,
    };

    pub const AUTH: RateLimit = RateLimit {
        scope: "auth",
        requests: RATE_LIMIT_AUTH_REQUESTS,
        window_seconds: RATE_LIMIT_AUTH_WINDOW_SECONDS,
    };

    fn key(&self, client: &str) -> String {
        format!("{}:{}", self.scope, client)
    }

    fn exceeded(&self) -> RateLimited {
        RateLimited {
            retry_after: self.window_seconds,
        }
    }

    /// Budget headers for a request that was let through.
    fn annotate(&self, headers: &mut HeaderMap, count: u64) {
        headers.insert("X-RateLimit-Limit", HeaderValue::from(self.requests));
        headers.insert(
            "X-RateLimit-Remaining",
            HeaderValue::from(self.requests.saturating_sub(count)),
        );
    }
}

/// 429 response
#[derive(Debug, PartialEq, Eq)]
pub struct RateLimited {
    pub retry_after: u64,
}

impl IntoResponse for RateLimited {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u64));

        let body = json!({
            "error": {
                "code": "RATE_LIMITED",
                "message": "Too many requests. Please try again later."
            }
        });

        (StatusCode::TOO_MANY_REQUESTS, headers, Json(body)).into_response()
    }
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// socket peer.
fn client_address(request: &Request) -> String {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first_hop) = header("X-Forwarded-For").and_then(|v| v.split(',').next()) {
        return first_hop.trim().to_string();
    }
    if let Some(real_ip) = header("X-Real-IP") {
        return real_ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn enforce(
    state: &AppState,
    limit: RateLimit,
    request: Request,
    next: Next,
) -> Result<Response, RateLimited> {
    let client = client_address(&request);

    let (count, allowed) = state
        .cache
        .check_rate_limit(&limit.key(&client), limit.requests, limit.window_seconds)
        .await
        .map_err(|e| {
            tracing::error!(scope = limit.scope, error = %e, "Rate limit check failed, denying request");
            limit.exceeded()
        })?;

    if !allowed {
        tracing::warn!(scope = limit.scope, client = %client, count, "Rate limit exceeded");
        return Err(limit.exceeded());
    }

    let mut response = next.run(request).await;
    limit.annotate(response.headers_mut(), count);
    Ok(response)
}

/// General API budget.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimited> {
    enforce(&state, RateLimit::GENERAL, request, next).await
}

/// Registration, login and verification budget.
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimited> {
    enforce(&state, RateLimit::AUTH, request, next).await
}
