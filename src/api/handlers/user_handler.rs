//! Signed-in user handlers.

use axum::{extract::State, response::Json, routing::get, Router};

use crate::api::AppState;
use crate::domain::{UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::policy::{require, AuthContext};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user))
}

/// Get the signed-in user's record
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<UserResponse>> {
    require(&ctx, UserRole::User)?;
    let user_id = ctx.user_id.ok_or(AppError::Unauthenticated)?;

    let user = state.auth_service.current_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}
