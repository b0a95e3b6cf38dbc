//! Migration: users table with profile and trading parameters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Firstname).string().not_null())
                    .col(ColumnDef::new(Users::Lastname).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string().not_null())
                    .col(ColumnDef::new(Users::Country).string().not_null())
                    .col(ColumnDef::new(Users::Metamask).string().not_null())
                    .col(ColumnDef::new(Users::Autotrade).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("USER"),
                    )
                    .col(
                        ColumnDef::new(Users::Approved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::Whitelisted).boolean().null().default(false))
                    .col(ColumnDef::new(Users::GroupId).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Users::AllowedTradingAmountFrom)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Users::AllowedTradingAmountTo)
                            .double()
                            .null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Users::AdminFee).double().not_null().default(0.0))
                    .col(ColumnDef::new(Users::UserProfit).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(Users::IntroducerFee)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Users::EmailVerified).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Both admin lists filter on approval and sort newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_users_approved_created_at")
                    .table(Users::Table)
                    .col(Users::Approved)
                    .col(Users::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Firstname,
    Lastname,
    Phone,
    Country,
    Metamask,
    Autotrade,
    Role,
    Approved,
    Whitelisted,
    GroupId,
    AllowedTradingAmountFrom,
    AllowedTradingAmountTo,
    AdminFee,
    UserProfit,
    IntroducerFee,
    EmailVerified,
    CreatedAt,
    UpdatedAt,
}
