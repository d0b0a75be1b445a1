use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(TaskLogs::Table)
                .if_not_exists()
                .col(ColumnDef::new(TaskLogs::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(TaskLogs::UserId).string_len(64).not_null())
                .col(ColumnDef::new(TaskLogs::Date).date().not_null())
                .col(ColumnDef::new(TaskLogs::Counter).integer().not_null().default(0))
                .col(ColumnDef::new(TaskLogs::LastClaim).timestamp_with_time_zone().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_task_logs_user")
                        .from(TaskLogs::Table, TaskLogs::UserId)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        // One counter row per user per calendar day
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_task_logs_user_date")
                .table(TaskLogs::Table)
                .col(TaskLogs::UserId)
                .col(TaskLogs::Date)
                .unique()
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TaskLogs::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TaskLogs {
    Table,
    Id,
    UserId,
    Date,
    Counter,
    LastClaim,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
