use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(CompanyBanks::Table)
                .if_not_exists()
                .col(ColumnDef::new(CompanyBanks::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(CompanyBanks::BankName).string().not_null())
                .col(ColumnDef::new(CompanyBanks::AccountNumber).string().not_null())
                .col(ColumnDef::new(CompanyBanks::AccountName).string().not_null())
                .col(ColumnDef::new(CompanyBanks::IsActive).boolean().not_null().default(true))
                .col(
                    ColumnDef::new(CompanyBanks::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(CompanyBanks::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        manager.create_table(
            Table::create()
                .table(ContactCenters::Table)
                .if_not_exists()
                .col(ColumnDef::new(ContactCenters::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(ContactCenters::Name).string().not_null())
                .col(ColumnDef::new(ContactCenters::ContactType).string_len(32).not_null())
                .col(ColumnDef::new(ContactCenters::Value).string().not_null())
                .col(ColumnDef::new(ContactCenters::Sequence).integer().not_null().default(0))
                .col(ColumnDef::new(ContactCenters::IsActive).boolean().not_null().default(true))
                .col(
                    ColumnDef::new(ContactCenters::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(ContactCenters::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        manager.create_table(
            Table::create()
                .table(TaskConfigs::Table)
                .if_not_exists()
                .col(ColumnDef::new(TaskConfigs::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(TaskConfigs::Title).string().not_null())
                .col(ColumnDef::new(TaskConfigs::Url).text().not_null())
                .col(ColumnDef::new(TaskConfigs::Sequence).integer().not_null().default(0))
                .col(ColumnDef::new(TaskConfigs::IsActive).boolean().not_null().default(true))
                .col(
                    ColumnDef::new(TaskConfigs::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(TaskConfigs::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TaskConfigs::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ContactCenters::Table).to_owned()).await?;

        manager.drop_table(Table::drop().table(CompanyBanks::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CompanyBanks {
    Table,
    Id,
    BankName,
    AccountNumber,
    AccountName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ContactCenters {
    Table,
    Id,
    Name,
    ContactType,
    Value,
    Sequence,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TaskConfigs {
    Table,
    Id,
    Title,
    Url,
    Sequence,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
