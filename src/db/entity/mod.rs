pub mod user;
pub mod wallet;
pub mod transaction;
pub mod task_log;
pub mod company_bank;
pub mod contact_center;
pub mod task_config;

pub use user::Entity as User;
pub use wallet::Entity as Wallet;
pub use transaction::Entity as Transaction;
pub use task_log::Entity as TaskLog;
pub use company_bank::Entity as CompanyBank;
pub use contact_center::Entity as ContactCenter;
pub use task_config::Entity as TaskConfig;
