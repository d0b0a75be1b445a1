pub mod account_service;
pub mod balance_engine;
pub mod ledger_service;
pub mod network_service;
pub mod reference_service;
pub mod task_counter;

pub use account_service::AccountService;
pub use balance_engine::BalanceEngine;
pub use ledger_service::LedgerService;
pub use network_service::NetworkService;
pub use reference_service::ReferenceService;
pub use task_counter::TaskCounter;
