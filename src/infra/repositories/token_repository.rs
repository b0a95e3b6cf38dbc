//! Verification token repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::entities::verification_token::{self, ActiveModel, Entity as TokenEntity};
use crate::domain::VerificationToken;
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a token, replacing any previous token for the same email.
    async fn replace(&self, token: &VerificationToken) -> AppResult<VerificationToken>;

    async fn find_by_token(&self, token: &str) -> AppResult<Option<VerificationToken>>;

    async fn delete(&self, token: &VerificationToken) -> AppResult<()>;
}

pub struct TokenStore {
    db: DatabaseConnection,
}

impl TokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn replace(&self, token: &VerificationToken) -> AppResult<VerificationToken> {
        TokenEntity::delete_many()
            .filter(verification_token::Column::Email.eq(token.email.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        let model = ActiveModel {
            id: Set(token.id),
            email: Set(token.email.clone()),
            token: Set(token.token.clone()),
            expires_at: Set(token.expires_at),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(VerificationToken::from(model))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<VerificationToken>> {
        let result = TokenEntity::find()
            .filter(verification_token::Column::Token.eq(token))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(VerificationToken::from))
    }

    async fn delete(&self, token: &VerificationToken) -> AppResult<()> {
        TokenEntity::delete_by_id(token.id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
