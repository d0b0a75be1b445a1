use chrono::{ DateTime, Duration, Utc };
use sea_orm::{ DatabaseConnection, DatabaseTransaction, TransactionTrait };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::config::SettlementRules;
use crate::db::entity::{ transaction, user, wallet };
use crate::db::{
    BalanceDelta,
    NewTransaction,
    TransactionRepository,
    UserRepository,
    WalletRepository,
};
use crate::enums::{ AdjustmentAction, TxStatus, TxType, WalletType };
use crate::error::{ AppError, Result };
use crate::tiers;

#[derive(Debug, Clone, Deserialize)]
pub struct DepositRequest {
    pub amount: i64,
    pub proof_image_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    pub amount: i64,
    pub bank_name: String,
    pub bank_account: String,
    pub account_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentRequest {
    pub user_id: String,
    pub wallet_type: WalletType,
    pub action: AdjustmentAction,
    pub amount: i64,
    pub notes: Option<String>,
    #[serde(default)]
    pub trigger_bonus: bool,
}

/// Result of an approval: the settled row plus whatever it cascaded into.
#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub transaction: transaction::Model,
    pub wallet: wallet::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_bonus: Option<transaction::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Adjustment {
    pub transaction: transaction::Model,
    pub wallet: wallet::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor_bonus: Option<transaction::Model>,
}

/// Wallet state machine. Every public operation runs as one database
/// transaction: either every row it touches is written or none is.
#[derive(Clone)]
pub struct BalanceEngine {
    db: DatabaseConnection,
    rules: SettlementRules,
}

impl BalanceEngine {
    pub fn new(db: DatabaseConnection, rules: SettlementRules) -> Self {
        Self { db, rules }
    }

    /// Records a PENDING deposit. Funds only move once an admin approves it.
    pub async fn submit_deposit(
        &self,
        user_id: &str,
        request: DepositRequest,
        now: DateTime<Utc>
    ) -> Result<transaction::Model> {
        if request.amount <= 0 {
            return Err(AppError::ValidationError("Deposit amount must be positive".into()));
        }
        tiers::tier_for_deposit_amount(request.amount)?;

        let txn = self.db.begin().await?;

        let user = UserRepository::new(&txn).find_by_id(user_id).await?;
        let wallet = WalletRepository::new(&txn).lock_by_user(user_id).await?;

        if user.tier_level > 0 && wallet.balance_deposit > 0 {
            return Err(AppError::DuplicateActiveDeposit);
        }

        let mut new_tx = NewTransaction::new(user_id, TxType::Deposit, request.amount, TxStatus::Pending)
            .notes(non_blank(request.notes));
        new_tx.proof_image_url = non_blank(request.proof_image_url);

        let deposit = TransactionRepository::new(&txn).create(new_tx, now).await?;
        txn.commit().await?;

        tracing::info!(
            "Deposit {} submitted by {} for {}",
            deposit.id,
            user_id,
            deposit.amount
        );

        Ok(deposit)
    }

    pub async fn approve_deposit(&self, transaction_id: Uuid, now: DateTime<Utc>) -> Result<Settlement> {
        let txn = self.db.begin().await?;

        let deposit = lock_pending(&txn, transaction_id, TxType::Deposit).await?;
        let tier = tiers::tier_for_deposit_amount(deposit.amount)?;

        let users = UserRepository::new(&txn);
        let user = users.find_by_id(&deposit.user_id).await?;
        let sponsor_id = user.sponsor_id.clone();

        let (wallet, sponsor_wallet) = lock_with_sponsor(
            &txn,
            &user.id,
            sponsor_id.as_deref()
        ).await?;

        // Another deposit may have been approved since this one was submitted
        if user.tier_level > 0 && wallet.balance_deposit > 0 {
            return Err(AppError::DuplicateActiveDeposit);
        }

        let user = users.activate_tier(user, tier.level, now).await?;

        let unlock_date = now + Duration::days(self.rules.lock_period_days);
        let wallet = WalletRepository::new(&txn).apply(
            wallet,
            BalanceDelta::deposit(deposit.amount),
            Some(unlock_date),
            now
        ).await?;

        let sponsor_bonus = match sponsor_wallet {
            Some(sponsor_wallet) => {
                self.credit_sponsor_bonus(&txn, &user, sponsor_wallet, deposit.amount, now).await?
            }
            None => None,
        };

        let settled = TransactionRepository::new(&txn).settle(
            deposit.id,
            TxStatus::Success,
            None,
            now
        ).await?;

        txn.commit().await?;

        tracing::info!(
            "Deposit {} approved: user {} now tier {}, locked until {}",
            settled.id,
            user.id,
            tier.level,
            unlock_date
        );

        Ok(Settlement {
            transaction: settled,
            wallet,
            sponsor_bonus,
        })
    }

    /// Deposits never touched the wallet, so rejecting only settles the row.
    pub async fn reject_deposit(
        &self,
        transaction_id: Uuid,
        reason: String,
        now: DateTime<Utc>
    ) -> Result<transaction::Model> {
        let reason = required_reason(reason)?;
        let txn = self.db.begin().await?;

        let deposit = lock_pending(&txn, transaction_id, TxType::Deposit).await?;
        let rejected = TransactionRepository::new(&txn).settle(
            deposit.id,
            TxStatus::Rejected,
            Some(reason),
            now
        ).await?;

        txn.commit().await?;

        tracing::info!("Deposit {} of user {} rejected", rejected.id, rejected.user_id);

        Ok(rejected)
    }

    /// Debits the available balance right away; a rejection refunds it.
    pub async fn submit_withdrawal(
        &self,
        user_id: &str,
        request: WithdrawRequest,
        now: DateTime<Utc>
    ) -> Result<transaction::Model> {
        if request.amount <= 0 {
            return Err(AppError::ValidationError("Withdrawal amount must be positive".into()));
        }

        let bank_name = required_field("bank_name", request.bank_name)?;
        let bank_account = required_field("bank_account", request.bank_account)?;
        let account_name = required_field("account_name", request.account_name)?;

        let txn = self.db.begin().await?;

        let wallets = WalletRepository::new(&txn);
        let wallet = wallets.lock_by_user(user_id).await?;

        // Unaffordable requests report InsufficientBalance even below the minimum
        if request.amount > wallet.balance_available {
            return Err(AppError::InsufficientBalance);
        }
        if request.amount < self.rules.min_withdraw_amount {
            return Err(AppError::BelowMinimum { minimum: self.rules.min_withdraw_amount });
        }

        wallets.apply(wallet, BalanceDelta::available(-request.amount), None, now).await?;

        let mut new_tx = NewTransaction::new(
            user_id,
            TxType::WdAvailable,
            request.amount,
            TxStatus::Pending
        );
        new_tx.bank_name = Some(bank_name);
        new_tx.bank_account = Some(bank_account);
        new_tx.account_name = Some(account_name);

        let withdrawal = TransactionRepository::new(&txn).create(new_tx, now).await?;
        txn.commit().await?;

        tracing::info!(
            "Withdrawal {} submitted by {} for {}",
            withdrawal.id,
            user_id,
            withdrawal.amount
        );

        Ok(withdrawal)
    }

    /// Funds already left the wallet at submission; approval only settles.
    pub async fn approve_withdrawal(
        &self,
        transaction_id: Uuid,
        now: DateTime<Utc>
    ) -> Result<transaction::Model> {
        let txn = self.db.begin().await?;

        let withdrawal = lock_pending(&txn, transaction_id, TxType::WdAvailable).await?;
        let approved = TransactionRepository::new(&txn).settle(
            withdrawal.id,
            TxStatus::Success,
            None,
            now
        ).await?;

        txn.commit().await?;

        tracing::info!("Withdrawal {} of user {} approved", approved.id, approved.user_id);

        Ok(approved)
    }

    pub async fn reject_withdrawal(
        &self,
        transaction_id: Uuid,
        reason: String,
        now: DateTime<Utc>
    ) -> Result<Settlement> {
        let reason = required_reason(reason)?;
        let txn = self.db.begin().await?;

        let withdrawal = lock_pending(&txn, transaction_id, TxType::WdAvailable).await?;

        let wallets = WalletRepository::new(&txn);
        let wallet = wallets.lock_by_user(&withdrawal.user_id).await?;
        let wallet = wallets.apply(
            wallet,
            BalanceDelta::available(withdrawal.amount),
            None,
            now
        ).await?;

        let rejected = TransactionRepository::new(&txn).settle(
            withdrawal.id,
            TxStatus::Rejected,
            Some(reason),
            now
        ).await?;

        txn.commit().await?;

        tracing::info!(
            "Withdrawal {} rejected, refunded {} to {}",
            rejected.id,
            rejected.amount,
            rejected.user_id
        );

        Ok(Settlement {
            transaction: rejected,
            wallet,
            sponsor_bonus: None,
        })
    }

    /// Admin correction of a deposit or available balance. Always audited
    /// with a MANUAL_ADJUSTMENT row; a CUT can never drive a balance negative.
    pub async fn manual_adjustment(
        &self,
        request: AdjustmentRequest,
        now: DateTime<Utc>
    ) -> Result<Adjustment> {
        if request.amount <= 0 {
            return Err(AppError::ValidationError("Adjustment amount must be positive".into()));
        }

        let adds_deposit =
            request.wallet_type == WalletType::DepositLocked &&
            request.action == AdjustmentAction::Add;

        let txn = self.db.begin().await?;

        let user = UserRepository::new(&txn).find_by_id(&request.user_id).await?;
        let bonus_sponsor = if adds_deposit && request.trigger_bonus {
            user.sponsor_id.clone()
        } else {
            None
        };

        let (wallet, sponsor_wallet) = lock_with_sponsor(
            &txn,
            &user.id,
            bonus_sponsor.as_deref()
        ).await?;

        let delta = request.action.signed(request.amount);
        let balance_delta = match request.wallet_type {
            WalletType::DepositLocked => BalanceDelta::deposit(delta),
            WalletType::Available => BalanceDelta::available(delta),
        };
        let unlock_date = if adds_deposit {
            Some(now + Duration::days(self.rules.lock_period_days))
        } else {
            None
        };

        let wallet = WalletRepository::new(&txn).apply(wallet, balance_delta, unlock_date, now).await?;

        let sponsor_bonus = match sponsor_wallet {
            Some(sponsor_wallet) => {
                self.credit_sponsor_bonus(&txn, &user, sponsor_wallet, request.amount, now).await?
            }
            None => None,
        };

        let mut new_tx = NewTransaction::new(
            &user.id,
            TxType::ManualAdjustment,
            delta.abs(),
            TxStatus::Success
        ).notes(non_blank(request.notes));
        new_tx.wallet_type = Some(request.wallet_type);
        new_tx.adjustment_action = Some(request.action);

        let adjustment = TransactionRepository::new(&txn).create(new_tx, now).await?;
        txn.commit().await?;

        tracing::info!(
            "Manual adjustment {}: {} {} on {} of user {}",
            adjustment.id,
            request.action,
            request.amount,
            request.wallet_type,
            user.id
        );

        Ok(Adjustment {
            transaction: adjustment,
            wallet,
            sponsor_bonus,
        })
    }

    /// Credits the floored sponsor bonus straight into the sponsor's
    /// available balance. Returns None when the bonus rounds down to zero.
    async fn credit_sponsor_bonus(
        &self,
        txn: &DatabaseTransaction,
        user: &user::Model,
        sponsor_wallet: wallet::Model,
        amount: i64,
        now: DateTime<Utc>
    ) -> Result<Option<transaction::Model>> {
        let bonus = self.rules.sponsor_bonus(amount);
        if bonus <= 0 {
            return Ok(None);
        }

        let sponsor_id = sponsor_wallet.user_id.clone();
        WalletRepository::new(txn).apply(
            sponsor_wallet,
            BalanceDelta::available(bonus),
            None,
            now
        ).await?;

        let new_tx = NewTransaction::new(
            &sponsor_id,
            TxType::BonusSponsor,
            bonus,
            TxStatus::Success
        ).notes(Some(format!("Sponsor bonus from {}", user.id)));

        let bonus_tx = TransactionRepository::new(txn).create(new_tx, now).await?;

        tracing::info!("Sponsor bonus {} credited to {} from {}", bonus, sponsor_id, user.id);

        Ok(Some(bonus_tx))
    }
}

/// Locks a transaction row and checks it is a PENDING row of `expected` type.
async fn lock_pending(
    txn: &DatabaseTransaction,
    transaction_id: Uuid,
    expected: TxType
) -> Result<transaction::Model> {
    let row = TransactionRepository::new(txn).lock_by_id(transaction_id).await?;

    if row.kind()? != expected {
        return Err(
            AppError::ValidationError(
                format!("Transaction {} is a {}, not a {}", row.id, row.tx_type, expected)
            )
        );
    }
    if row.state()?.is_terminal() {
        return Err(AppError::AlreadyProcessed);
    }

    Ok(row)
}

/// Locks the user's wallet, and the sponsor's when one is given, in a
/// deadlock-free order.
async fn lock_with_sponsor(
    txn: &DatabaseTransaction,
    user_id: &str,
    sponsor_id: Option<&str>
) -> Result<(wallet::Model, Option<wallet::Model>)> {
    let wallets = WalletRepository::new(txn);

    match sponsor_id {
        Some(sponsor_id) if sponsor_id != user_id => {
            let (wallet, sponsor_wallet) = wallets.lock_pair(user_id, sponsor_id).await?;
            Ok((wallet, Some(sponsor_wallet)))
        }
        _ => Ok((wallets.lock_by_user(user_id).await?, None)),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required_field(name: &str, value: String) -> Result<String> {
    non_blank(Some(value)).ok_or_else(|| AppError::ValidationError(format!("{} is required", name)))
}

fn required_reason(reason: String) -> Result<String> {
    required_field("reason", reason)
}
