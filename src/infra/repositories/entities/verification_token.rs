//! Verification token database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::VerificationToken;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    #[sea_orm(unique)]
    pub token: String,
    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for VerificationToken {
    fn from(model: Model) -> Self {
        VerificationToken {
            id: model.id,
            email: model.email,
            token: model.token,
            expires_at: model.expires_at,
        }
    }
}
