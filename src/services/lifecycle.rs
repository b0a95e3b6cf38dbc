//! User lifecycle - the admin-driven transitions of a user record.
//!
//! ```text
//! Pending --approve--> Approved --edit--> Approved
//!    |                    |
//!    +------delete--------+----> (gone)
//! ```
//!
//! Every operation checks the caller against the role gate before any
//! input is parsed or the store is touched, and announces the views it
//! made stale only after its write succeeded.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::invalidation::{InvalidationSink, ViewInvalidation};
use crate::domain::{User, UserResponse, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::policy::{require, AuthContext};
use crate::validation::{validate, ApproveUserRequest, EditApprovedUserRequest};

pub const APPROVED: &str = "User approved successfully!";
pub const DELETED: &str = "User deleted successfully!";
pub const UPDATED: &str = "User updated successfully!";

const APPROVE_FAILED: &str = "Error approving user";
const DELETE_FAILED: &str = "Error deleting user";
const UPDATE_FAILED: &str = "Error updating user";
const LIST_FAILED: &str = "Error fetching users";

/// Admin operations on user records.
#[async_trait]
pub trait UserLifecycle: Send + Sync {
    /// Pending → Approved with trading parameters from the approval form.
    async fn approve(&self, ctx: &AuthContext, user_id: Uuid, input: Value) -> AppResult<User>;

    /// Remove a user. Rejecting a pending user uses the same path.
    async fn delete_user(&self, ctx: &AuthContext, user_id: Uuid) -> AppResult<()>;

    /// Overwrite every editable field of a user.
    async fn edit_approved(&self, ctx: &AuthContext, user_id: Uuid, input: Value)
        -> AppResult<User>;

    async fn list_pending(&self, ctx: &AuthContext) -> AppResult<Vec<UserResponse>>;

    async fn list_approved(&self, ctx: &AuthContext) -> AppResult<Vec<UserResponse>>;
}

/// Concrete implementation of UserLifecycle using Unit of Work.
pub struct LifecycleManager<U: UnitOfWork> {
    uow: Arc<U>,
    sink: Arc<dyn InvalidationSink>,
}

impl<U: UnitOfWork> LifecycleManager<U> {
    pub fn new(uow: Arc<U>, sink: Arc<dyn InvalidationSink>) -> Self {
        Self { uow, sink }
    }

    async fn load(&self, user_id: Uuid, failure: &str) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(user_id)
            .await
            .map_err(|e| e.into_persistence(failure))?
            .ok_or_not_found()
    }

    async fn list(&self, ctx: &AuthContext, approved: bool) -> AppResult<Vec<UserResponse>> {
        require(ctx, UserRole::Admin)?;

        let users = self
            .uow
            .users()
            .list_by_approval(approved)
            .await
            .map_err(|e| e.into_persistence(LIST_FAILED))?;

        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}

#[async_trait]
impl<U: UnitOfWork> UserLifecycle for LifecycleManager<U> {
    async fn approve(&self, ctx: &AuthContext, user_id: Uuid, input: Value) -> AppResult<User> {
        require(ctx, UserRole::Admin)?;
        let params = validate::<ApproveUserRequest>(input)?;

        let mut user = self.load(user_id, APPROVE_FAILED).await?;
        user.approve(params);

        let saved = self
            .uow
            .users()
            .save(&user)
            .await
            .map_err(|e| e.into_persistence(APPROVE_FAILED))?;

        tracing::info!(user_id = %saved.id, admin_id = ?ctx.user_id, "User approved");
        self.sink.emit(ViewInvalidation::PendingList);
        self.sink.emit(ViewInvalidation::ApprovedList);

        Ok(saved)
    }

    async fn delete_user(&self, ctx: &AuthContext, user_id: Uuid) -> AppResult<()> {
        require(ctx, UserRole::Admin)?;

        self.uow.users().delete(user_id).await.map_err(|e| match e {
            AppError::NotFound => {
                tracing::warn!(user_id = %user_id, "Delete of unknown user");
                AppError::Persistence(DELETE_FAILED.to_string())
            }
            other => other.into_persistence(DELETE_FAILED),
        })?;

        tracing::info!(user_id = %user_id, admin_id = ?ctx.user_id, "User deleted");
        self.sink.emit(ViewInvalidation::ApprovedList);
        self.sink.emit(ViewInvalidation::PendingList);

        Ok(())
    }

    async fn edit_approved(
        &self,
        ctx: &AuthContext,
        user_id: Uuid,
        input: Value,
    ) -> AppResult<User> {
        require(ctx, UserRole::Admin)?;
        let edit = validate::<EditApprovedUserRequest>(input)?;

        let mut user = self.load(user_id, UPDATE_FAILED).await?;

        if edit.email != user.email {
            let owner = self
                .uow
                .users()
                .find_by_email(&edit.email)
                .await
                .map_err(|e| e.into_persistence(UPDATE_FAILED))?;
            if owner.is_some_and(|other| other.id != user.id) {
                return Err(AppError::conflict("Email already in use!"));
            }
        }

        let was_approved = user.approved;
        user.apply_edit(edit);

        let saved = self
            .uow
            .users()
            .save(&user)
            .await
            .map_err(|e| e.into_persistence(UPDATE_FAILED))?;

        tracing::info!(
            user_id = %saved.id,
            admin_id = ?ctx.user_id,
            approved = saved.approved,
            "User updated"
        );
        self.sink.emit(ViewInvalidation::ApprovedList);
        if was_approved != saved.approved {
            self.sink.emit(ViewInvalidation::PendingList);
        }

        Ok(saved)
    }

    async fn list_pending(&self, ctx: &AuthContext) -> AppResult<Vec<UserResponse>> {
        self.list(ctx, false).await
    }

    async fn list_approved(&self, ctx: &AuthContext) -> AppResult<Vec<UserResponse>> {
        self.list(ctx, true).await
    }
}
