use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ─── TxType ──────────────────────────────────────────────────────────

/// Kind of money movement recorded in the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxType {
    Deposit,
    WdAvailable,
    WdLocked,
    BonusSponsor,
    BonusPairing,
    BonusMatching,
    RewardTask,
    ManualAdjustment,
}

impl TxType {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Deposit => "DEPOSIT",
            TxType::WdAvailable => "WD_AVAILABLE",
            TxType::WdLocked => "WD_LOCKED",
            TxType::BonusSponsor => "BONUS_SPONSOR",
            TxType::BonusPairing => "BONUS_PAIRING",
            TxType::BonusMatching => "BONUS_MATCHING",
            TxType::RewardTask => "REWARD_TASK",
            TxType::ManualAdjustment => "MANUAL_ADJUSTMENT",
        }
    }

    pub fn all() -> &'static [TxType] {
        &[
            TxType::Deposit,
            TxType::WdAvailable,
            TxType::WdLocked,
            TxType::BonusSponsor,
            TxType::BonusPairing,
            TxType::BonusMatching,
            TxType::RewardTask,
            TxType::ManualAdjustment,
        ]
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        TxType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| AppError::ValidationError(format!("Invalid transaction type: {}", s)))
    }
}

// ─── TxStatus ────────────────────────────────────────────────────────

/// Settlement state of a transaction. Only `Pending` can move, and only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Pending,
    Success,
    Rejected,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "PENDING",
            TxStatus::Success => "SUCCESS",
            TxStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(TxStatus::Pending),
            "SUCCESS" => Ok(TxStatus::Success),
            "REJECTED" => Ok(TxStatus::Rejected),
            _ => Err(AppError::ValidationError(format!("Invalid transaction status: {}", s))),
        }
    }
}

// ─── Position ────────────────────────────────────────────────────────

/// Slot under a binary upline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Left,
    Right,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Left => "LEFT",
            Position::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LEFT" => Ok(Position::Left),
            "RIGHT" => Ok(Position::Right),
            _ => Err(AppError::ValidationError(format!("Invalid position: {}", s))),
        }
    }
}

// ─── WalletType ──────────────────────────────────────────────────────

/// Wallet field an admin adjustment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletType {
    DepositLocked,
    Available,
}

impl WalletType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::DepositLocked => "DEPOSIT_LOCKED",
            WalletType::Available => "AVAILABLE",
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEPOSIT_LOCKED" => Ok(WalletType::DepositLocked),
            "AVAILABLE" => Ok(WalletType::Available),
            _ => Err(AppError::ValidationError(format!("Invalid wallet type: {}", s))),
        }
    }
}

// ─── AdjustmentAction ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentAction {
    Add,
    Cut,
}

impl AdjustmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentAction::Add => "ADD",
            AdjustmentAction::Cut => "CUT",
        }
    }

    /// Signed delta for a positive amount.
    pub fn signed(&self, amount: i64) -> i64 {
        match self {
            AdjustmentAction::Add => amount,
            AdjustmentAction::Cut => -amount,
        }
    }
}

impl fmt::Display for AdjustmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADD" => Ok(AdjustmentAction::Add),
            "CUT" => Ok(AdjustmentAction::Cut),
            _ => Err(AppError::ValidationError(format!("Invalid adjustment action: {}", s))),
        }
    }
}
