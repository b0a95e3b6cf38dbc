//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Profile, TradingBound, TradingProfile, User, UserRole};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub country: String,
    pub metamask: String,
    pub autotrade: String,
    pub role: String,
    pub approved: bool,
    pub whitelisted: Option<bool>,
    pub group_id: String,
    pub allowed_trading_amount_from: f64,
    /// NULL means unlimited
    pub allowed_trading_amount_to: Option<f64>,
    pub admin_fee: f64,
    pub user_profit: f64,
    pub introducer_fee: f64,
    pub email_verified: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            profile: Profile {
                firstname: model.firstname,
                lastname: model.lastname,
                phone: model.phone,
                country: model.country,
                metamask: model.metamask,
                autotrade: model.autotrade,
            },
            role: UserRole::from(model.role.as_str()),
            approved: model.approved,
            whitelisted: model.whitelisted,
            trading: TradingProfile {
                group_id: model.group_id,
                allowed_trading_amount_from: model.allowed_trading_amount_from,
                allowed_trading_amount_to: TradingBound::from_storage(
                    model.allowed_trading_amount_to,
                ),
                admin_fee: model.admin_fee,
                user_profit: model.user_profit,
                introducer_fee: model.introducer_fee,
            },
            email_verified: model.email_verified,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Every column of a domain user, for inserts and full-row writes.
impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            firstname: Set(user.profile.firstname.clone()),
            lastname: Set(user.profile.lastname.clone()),
            phone: Set(user.profile.phone.clone()),
            country: Set(user.profile.country.clone()),
            metamask: Set(user.profile.metamask.clone()),
            autotrade: Set(user.profile.autotrade.clone()),
            role: Set(user.role.to_string()),
            approved: Set(user.approved),
            whitelisted: Set(user.whitelisted),
            group_id: Set(user.trading.group_id.clone()),
            allowed_trading_amount_from: Set(user.trading.allowed_trading_amount_from),
            allowed_trading_amount_to: Set(user.trading.allowed_trading_amount_to.to_storage()),
            admin_fee: Set(user.trading.admin_fee),
            user_profit: Set(user.trading.user_profit),
            introducer_fee: Set(user.trading.introducer_fee),
            email_verified: Set(user.email_verified),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
    }
}
