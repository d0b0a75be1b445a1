pub use sea_orm_migration::prelude::*;

mod m20260101_000001_create_users_table;
mod m20260101_000002_create_transactions_table;
mod m20260101_000003_create_task_logs_table;
mod m20260101_000004_create_reference_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_users_table::Migration),
            Box::new(m20260101_000002_create_transactions_table::Migration),
            Box::new(m20260101_000003_create_task_logs_table::Migration),
            Box::new(m20260101_000004_create_reference_tables::Migration)
        ]
    }
}
