//! Admin user-management handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::JsonInput;
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::policy::AuthContext;
use crate::services::lifecycle::{APPROVED, DELETED, UPDATED};
use crate::types::ActionResponse;
use crate::validation::{ApproveUserRequest, EditApprovedUserRequest};

/// Edit result carrying the updated record
#[derive(Debug, Serialize, ToSchema)]
pub struct EditUserResponse {
    #[schema(example = "User updated successfully!")]
    pub success: String,
    pub user: UserResponse,
}

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users/pending", get(list_pending))
        .route("/users/approved", get(list_approved))
        .route("/users/:id/approve", post(approve_user))
        .route("/users/:id", put(edit_user).delete(delete_user))
}

/// Approve a pending user with trading parameters
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/approve",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ApproveUserRequest,
    responses(
        (status = 200, description = "User approved", body = ActionResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    JsonInput(input): JsonInput,
) -> AppResult<ActionResponse> {
    state.lifecycle.approve(&ctx, id, input).await?;
    Ok(ActionResponse::new(APPROVED))
}

/// Delete (or reject) a user
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ActionResponse),
        (status = 403, description = "Admin access required"),
        (status = 500, description = "Error deleting user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> AppResult<ActionResponse> {
    state.lifecycle.delete_user(&ctx, id).await?;
    Ok(ActionResponse::new(DELETED))
}

/// Overwrite an approved user's details
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = EditApprovedUserRequest,
    responses(
        (status = 200, description = "User updated", body = EditUserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn edit_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    JsonInput(input): JsonInput,
) -> AppResult<Json<EditUserResponse>> {
    let user = state.lifecycle.edit_approved(&ctx, id, input).await?;

    Ok(Json(EditUserResponse {
        success: UPDATED.to_string(),
        user: UserResponse::from(user),
    }))
}

/// Users awaiting review, newest first
#[utoipa::path(
    get,
    path = "/api/admin/users/pending",
    tag = "Admin",
    responses(
        (status = 200, description = "Pending users", body = Vec<UserResponse>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_pending(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<Vec<UserResponse>>> {
    Ok(Json(state.lifecycle.list_pending(&ctx).await?))
}

/// Approved users, newest first
#[utoipa::path(
    get,
    path = "/api/admin/users/approved",
    tag = "Admin",
    responses(
        (status = 200, description = "Approved users", body = Vec<UserResponse>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_approved(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> AppResult<Json<Vec<UserResponse>>> {
    Ok(Json(state.lifecycle.list_approved(&ctx).await?))
}
