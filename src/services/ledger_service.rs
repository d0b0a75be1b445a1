use chrono::{ DateTime, Utc };
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::entity::{ transaction, wallet };
use crate::db::{ TransactionFilter, TransactionRepository, UserRepository, WalletRepository };
use crate::enums::{ AdjustmentAction, TxStatus, TxType, WalletType };
use crate::error::{ AppError, Result };

#[derive(Debug, Clone, Serialize)]
pub struct WalletSummary {
    pub user_id: String,
    pub balance_deposit: i64,
    pub balance_reward_task: i64,
    pub balance_matching_lock: i64,
    pub balance_available: i64,
    pub total_locked: i64,
    pub unlock_date: Option<DateTime<Utc>>,
    pub is_unlocked: bool,
}

impl WalletSummary {
    pub fn new(wallet: &wallet::Model, now: DateTime<Utc>) -> Self {
        Self {
            user_id: wallet.user_id.clone(),
            balance_deposit: wallet.balance_deposit,
            balance_reward_task: wallet.balance_reward_task,
            balance_matching_lock: wallet.balance_matching_lock,
            balance_available: wallet.balance_available,
            total_locked: wallet.total_locked(),
            unlock_date: wallet.unlock_date,
            is_unlocked: wallet.is_unlocked(now),
        }
    }
}

/// Balances as recomputed from the transaction log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub deposit: i64,
    pub reward_task: i64,
    pub matching_lock: i64,
    pub available: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub user_id: String,
    pub expected: Balances,
    pub actual: Balances,
    pub balanced: bool,
}

/// Read side of the ledger: wallet views, history and reconciliation.
#[derive(Clone)]
pub struct LedgerService {
    db: DatabaseConnection,
}

impl LedgerService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn wallet_summary(&self, user_id: &str, now: DateTime<Utc>) -> Result<WalletSummary> {
        let wallet = WalletRepository::new(&self.db).find_by_user(user_id).await?;
        Ok(WalletSummary::new(&wallet, now))
    }

    pub async fn user_transactions(
        &self,
        user_id: &str,
        mut filter: TransactionFilter
    ) -> Result<Vec<transaction::Model>> {
        UserRepository::new(&self.db).find_by_id(user_id).await?;

        filter.user_id = Some(user_id.to_string());
        TransactionRepository::new(&self.db).list(filter).await
    }

    pub async fn list_transactions(&self, filter: TransactionFilter) -> Result<Vec<transaction::Model>> {
        TransactionRepository::new(&self.db).list(filter).await
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<transaction::Model> {
        TransactionRepository::new(&self.db).find_by_id(id).await
    }

    /// Replays the user's transaction log and compares it with the wallet.
    pub async fn reconcile(&self, user_id: &str) -> Result<Reconciliation> {
        let wallet = WalletRepository::new(&self.db).find_by_user(user_id).await?;
        let rows = TransactionRepository::new(&self.db).all_for_user(user_id).await?;

        let expected = replay(&rows)?;
        let actual = Balances {
            deposit: wallet.balance_deposit,
            reward_task: wallet.balance_reward_task,
            matching_lock: wallet.balance_matching_lock,
            available: wallet.balance_available,
        };

        let balanced = expected == actual;
        if !balanced {
            tracing::warn!(
                "Ledger mismatch for {}: expected {:?}, wallet {:?}",
                user_id,
                expected,
                actual
            );
        }

        Ok(Reconciliation {
            user_id: user_id.to_string(),
            expected,
            actual,
            balanced,
        })
    }
}

/// Folds transaction rows into the balances they imply. Withdrawals count
/// while PENDING because submission already debited the wallet.
fn replay(rows: &[transaction::Model]) -> Result<Balances> {
    let mut balances = Balances::default();

    for row in rows {
        let status = row.state()?;
        let amount = row.amount;

        match row.kind()? {
            TxType::WdAvailable => {
                if status != TxStatus::Rejected {
                    balances.available -= amount;
                }
                continue;
            }
            // Locked-balance withdrawals are never created by this service
            TxType::WdLocked => {
                continue;
            }
            _ if status != TxStatus::Success => {
                continue;
            }
            TxType::Deposit => {
                balances.deposit += amount;
            }
            TxType::RewardTask => {
                balances.reward_task += amount;
            }
            TxType::BonusMatching => {
                balances.matching_lock += amount;
            }
            TxType::BonusSponsor | TxType::BonusPairing => {
                balances.available += amount;
            }
            TxType::ManualAdjustment => {
                let (wallet_type, action) = adjustment_target(row)?;
                let delta = action.signed(amount);
                match wallet_type {
                    WalletType::DepositLocked => {
                        balances.deposit += delta;
                    }
                    WalletType::Available => {
                        balances.available += delta;
                    }
                }
            }
        }
    }

    Ok(balances)
}

fn adjustment_target(row: &transaction::Model) -> Result<(WalletType, AdjustmentAction)> {
    let missing = || AppError::Internal(format!("Adjustment {} has no wallet target", row.id));

    let wallet_type = row.wallet_type.as_deref().ok_or_else(missing)?.parse()?;
    let action = row.adjustment_action.as_deref().ok_or_else(missing)?.parse()?;

    Ok((wallet_type, action))
}
