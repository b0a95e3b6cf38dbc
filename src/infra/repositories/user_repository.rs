//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Select, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by (normalized) username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user record
    async fn create(&self, user: &User) -> AppResult<User>;

    /// Write every column of an existing user. A vanished row is `NotFound`.
    async fn save(&self, user: &User) -> AppResult<User>;

    /// Permanently delete user. A missing row is `NotFound`.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Users with the given approval flag, newest first
    async fn list_by_approval(&self, approved: bool) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Users with the given approval flag, newest first.
    fn by_approval(approved: bool) -> Select<UserEntity> {
        UserEntity::find()
            .filter(user::Column::Approved.eq(approved))
            .order_by_desc(user::Column::CreatedAt)
    }
}

/// Conflict message for a unique-index violation reported by the database.
fn unique_conflict(detail: &str) -> AppError {
    if detail.contains("email") {
        AppError::conflict("Email already in use!")
    } else {
        AppError::conflict("Username already taken!")
    }
}

/// Writes can lose a uniqueness race against a concurrent registration or
/// edit; those surface as conflicts, not store failures.
fn write_error(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => unique_conflict(&detail),
        _ => AppError::from(e),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        let model = ActiveModel::from(user)
            .insert(&self.db)
            .await
            .map_err(write_error)?;

        Ok(User::from(model))
    }

    async fn save(&self, user: &User) -> AppResult<User> {
        // Every column is Set, so this is a full-row UPDATE keyed by id.
        match ActiveModel::from(user).update(&self.db).await {
            Ok(model) => Ok(User::from(model)),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound),
            Err(e) => Err(write_error(e)),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list_by_approval(&self, approved: bool) -> AppResult<Vec<User>> {
        let models = Self::by_approval(approved)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
