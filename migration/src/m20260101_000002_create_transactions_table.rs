use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Transactions::Table)
                .if_not_exists()
                .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Transactions::UserId).string_len(64).not_null())
                .col(ColumnDef::new(Transactions::TxType).string_len(32).not_null())
                .col(
                    ColumnDef::new(Transactions::Amount)
                        .big_integer()
                        .not_null()
                        .check(Expr::col(Transactions::Amount).gt(0))
                )
                .col(ColumnDef::new(Transactions::Status).string_len(16).not_null())
                .col(ColumnDef::new(Transactions::WalletType).string_len(32).null())
                .col(ColumnDef::new(Transactions::AdjustmentAction).string_len(8).null())
                .col(ColumnDef::new(Transactions::ProofImageUrl).text().null())
                .col(ColumnDef::new(Transactions::BankName).string().null())
                .col(ColumnDef::new(Transactions::BankAccount).string().null())
                .col(ColumnDef::new(Transactions::AccountName).string().null())
                .col(ColumnDef::new(Transactions::Notes).text().null())
                .col(ColumnDef::new(Transactions::RejectedReason).text().null())
                .col(ColumnDef::new(Transactions::ProcessedAt).timestamp_with_time_zone().null())
                .col(
                    ColumnDef::new(Transactions::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_transactions_user")
                        .from(Transactions::Table, Transactions::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_transactions_user_created_at")
                .table(Transactions::Table)
                .col(Transactions::UserId)
                .col(Transactions::CreatedAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_transactions_status_type")
                .table(Transactions::Table)
                .col(Transactions::Status)
                .col(Transactions::TxType)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    UserId,
    TxType,
    Amount,
    Status,
    WalletType,
    AdjustmentAction,
    ProofImageUrl,
    BankName,
    BankAccount,
    AccountName,
    Notes,
    RejectedReason,
    ProcessedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
