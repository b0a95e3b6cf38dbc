//! Unit of Work - single point of access to every repository.
//!
//! Services depend on this trait rather than on individual stores, so a
//! test can swap the whole persistence layer with one fake.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{TokenRepository, TokenStore, UserRepository, UserStore};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get verification token repository
    fn tokens(&self) -> Arc<dyn TokenRepository>;
}

/// SeaORM-backed implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    token_repo: Arc<TokenStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            token_repo: Arc::new(TokenStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.token_repo.clone()
    }
}
