pub mod config;
pub mod enums;
pub mod error;
pub mod tiers;
pub mod db;
pub mod services;
pub mod api;

pub use config::{ Config, SettlementRules };
pub use enums::{ AdjustmentAction, Position, TxStatus, TxType, WalletType };
pub use error::{ AppError, Result };
