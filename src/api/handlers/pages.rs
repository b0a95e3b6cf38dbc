//! Page routes.
//!
//! Navigation targets guarded by the route access policy. They answer
//! with small JSON view models; rendering belongs to the client.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::config::{DEFAULT_LOGIN_REDIRECT, VERIFICATION_PATH};
use crate::domain::{UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::policy::{require, AuthContext};
use crate::services::{ViewInvalidation, EMAIL_VERIFIED};

/// A page and whatever data it shows
#[derive(Debug, Serialize)]
pub struct PageView<T: Serialize> {
    pub page: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl PageView<()> {
    fn empty(page: &'static str) -> Json<Self> {
        Json(Self { page, data: None })
    }
}

#[derive(Debug, Deserialize)]
pub struct VerificationQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerificationView {
    pub success: &'static str,
}

/// Create page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/auth/login", get(|| async { PageView::empty("login") }))
        .route("/auth/register", get(|| async { PageView::empty("register") }))
        .route("/auth/reset", get(|| async { PageView::empty("reset") }))
        .route(VERIFICATION_PATH, get(new_verification))
        .route(DEFAULT_LOGIN_REDIRECT, get(settings))
        .route("/admin/waitinglist", get(waiting_list))
        .route("/admin/approveduser", get(approved_users))
}

async fn home() -> Json<PageView<()>> {
    PageView::empty("home")
}

/// Landing page of an emailed verification link
async fn new_verification(
    State(state): State<AppState>,
    Query(query): Query<VerificationQuery>,
) -> AppResult<Json<PageView<VerificationView>>> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing token!"))?;

    state.auth_service.verify_email(token.trim()).await?;

    Ok(Json(PageView {
        page: "new-verification",
        data: Some(VerificationView {
            success: EMAIL_VERIFIED,
        }),
    }))
}

async fn settings(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<PageView<UserResponse>>> {
    let user_id = ctx.user_id.ok_or(AppError::Unauthenticated)?;
    let user = state.auth_service.current_user(user_id).await?;

    Ok(Json(PageView {
        page: "settings",
        data: Some(UserResponse::from(user)),
    }))
}

async fn waiting_list(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<PageView<Vec<UserResponse>>>> {
    // The cache must never answer before the role check does.
    require(&ctx, UserRole::Admin)?;

    let users = state
        .views
        .get_or_load(ViewInvalidation::PendingList, || {
            state.lifecycle.list_pending(&ctx)
        })
        .await?;

    Ok(Json(PageView {
        page: "waitinglist",
        data: Some(users),
    }))
}

async fn approved_users(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<PageView<Vec<UserResponse>>>> {
    require(&ctx, UserRole::Admin)?;

    let users = state
        .views
        .get_or_load(ViewInvalidation::ApprovedList, || {
            state.lifecycle.list_approved(&ctx)
        })
        .await?;

    Ok(Json(PageView {
        page: "approveduser",
        data: Some(users),
    }))
}
