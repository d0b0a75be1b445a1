use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(ColumnDef::new(Users::Id).string_len(64).not_null().primary_key())
                .col(ColumnDef::new(Users::Name).string().not_null())
                .col(ColumnDef::new(Users::Email).string().not_null())
                .col(ColumnDef::new(Users::TierLevel).integer().not_null().default(0))
                .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(false))
                .col(ColumnDef::new(Users::SponsorId).string_len(64).null())
                .col(ColumnDef::new(Users::UplineBinaryId).string_len(64).null())
                .col(ColumnDef::new(Users::Position).string_len(8).null())
                .col(
                    ColumnDef::new(Users::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(Users::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_users_sponsor")
                        .from(Users::Table, Users::SponsorId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_users_upline_binary")
                        .from(Users::Table, Users::UplineBinaryId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_users_sponsor_id")
                .table(Users::Table)
                .col(Users::SponsorId)
                .to_owned()
        ).await?;

        // At most one LEFT and one RIGHT child per binary upline
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_users_binary_slot")
                .table(Users::Table)
                .col(Users::UplineBinaryId)
                .col(Users::Position)
                .unique()
                .to_owned()
        ).await?;

        manager.create_table(
            Table::create()
                .table(Wallets::Table)
                .if_not_exists()
                .col(ColumnDef::new(Wallets::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Wallets::UserId).string_len(64).not_null().unique_key())
                .col(
                    ColumnDef::new(Wallets::BalanceDeposit)
                        .big_integer()
                        .not_null()
                        .default(0)
                        .check(Expr::col(Wallets::BalanceDeposit).gte(0))
                )
                .col(
                    ColumnDef::new(Wallets::BalanceRewardTask)
                        .big_integer()
                        .not_null()
                        .default(0)
                        .check(Expr::col(Wallets::BalanceRewardTask).gte(0))
                )
                .col(
                    ColumnDef::new(Wallets::BalanceMatchingLock)
                        .big_integer()
                        .not_null()
                        .default(0)
                        .check(Expr::col(Wallets::BalanceMatchingLock).gte(0))
                )
                .col(
                    ColumnDef::new(Wallets::BalanceAvailable)
                        .big_integer()
                        .not_null()
                        .default(0)
                        .check(Expr::col(Wallets::BalanceAvailable).gte(0))
                )
                .col(ColumnDef::new(Wallets::UnlockDate).timestamp_with_time_zone().null())
                .col(
                    ColumnDef::new(Wallets::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_wallets_user")
                        .from(Wallets::Table, Wallets::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wallets::Table).to_owned()).await?;

        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    TierLevel,
    IsActive,
    SponsorId,
    UplineBinaryId,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Wallets {
    Table,
    Id,
    UserId,
    BalanceDeposit,
    BalanceRewardTask,
    BalanceMatchingLock,
    BalanceAvailable,
    UnlockDate,
    UpdatedAt,
}
