pub mod entity;
pub use entity::*;

mod user_repository;
pub use user_repository::{ NewUser, UserRepository };

mod wallet_repository;
pub use wallet_repository::{ BalanceDelta, WalletRepository };

mod transaction_repository;
pub use transaction_repository::{ NewTransaction, TransactionFilter, TransactionRepository };

mod task_log_repository;
pub use task_log_repository::TaskLogRepository;

use sea_orm::{ ConnectOptions, Database, DatabaseConnection };
use sea_orm_migration::MigratorTrait;

use crate::error::Result;

/// Opens a connection pool and brings the schema up to date.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);

    // Each in-memory SQLite connection is its own database
    if database_url.starts_with("sqlite::memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;

    Ok(db)
}
