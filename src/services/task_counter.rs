use chrono::{ DateTime, Utc };
use sea_orm::{ DatabaseConnection, TransactionTrait };
use serde::Serialize;

use crate::config::SettlementRules;
use crate::db::entity::{ task_log, transaction, user, wallet };
use crate::db::{
    BalanceDelta,
    NewTransaction,
    TaskLogRepository,
    TransactionRepository,
    UserRepository,
    WalletRepository,
};
use crate::enums::{ TxStatus, TxType };
use crate::error::{ AppError, Result };
use crate::tiers::{ self, TierDefinition };

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub date: chrono::NaiveDate,
    pub counter: i32,
    pub max_tasks: i32,
    pub can_claim: bool,
    pub reward_per_task: i64,
    pub last_claim: Option<DateTime<Utc>>,
    /// Seconds until the rate limit allows the next claim; 0 when clear.
    pub wait_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimReceipt {
    pub counter: i32,
    pub max_tasks: i32,
    pub reward: i64,
    pub transaction: transaction::Model,
    pub wallet: wallet::Model,
}

/// Daily task quota per user. A missing row for today means a counter of
/// zero; rows are created on first touch, there is no reset job.
#[derive(Clone)]
pub struct TaskCounter {
    db: DatabaseConnection,
    rules: SettlementRules,
}

impl TaskCounter {
    pub fn new(db: DatabaseConnection, rules: SettlementRules) -> Self {
        Self { db, rules }
    }

    pub async fn get_status(&self, user_id: &str, now: DateTime<Utc>) -> Result<TaskStatus> {
        let user = UserRepository::new(&self.db).find_by_id(user_id).await?;
        let wallet = WalletRepository::new(&self.db).find_by_user(user_id).await?;
        let log = TaskLogRepository::new(&self.db).fetch_or_create(user_id, now.date_naive()).await?;

        let tier = member_tier(&user);
        let max_tasks = tier.map_or(self.rules.max_tasks_per_day, |t| self.daily_limit(t));
        let wait_seconds = self.wait_seconds(&log, now);

        let can_claim =
            log.counter < max_tasks &&
            wait_seconds == 0 &&
            tier.is_some_and(|t| wallet.balance_deposit >= t.deposit);

        Ok(TaskStatus {
            date: log.date,
            counter: log.counter,
            max_tasks,
            can_claim,
            reward_per_task: tier.map_or(0, |t| t.reward_per_task),
            last_claim: log.last_claim,
            wait_seconds,
        })
    }

    /// Counts one completed task and credits its reward into the locked
    /// task balance. Counter, wallet and ledger row commit together.
    pub async fn claim(&self, user_id: &str, now: DateTime<Utc>) -> Result<ClaimReceipt> {
        let txn = self.db.begin().await?;

        let user = UserRepository::new(&txn).find_by_id(user_id).await?;

        // The wallet lock serialises concurrent claims for this user
        let wallets = WalletRepository::new(&txn);
        let wallet = wallets.lock_by_user(user_id).await?;

        let logs = TaskLogRepository::new(&txn);
        let log = logs.fetch_or_create(user_id, now.date_naive()).await?;

        let tier = member_tier(&user).ok_or(AppError::AccountNotActive)?;
        if wallet.balance_deposit < tier.deposit {
            return Err(AppError::InsufficientDeposit { required: tier.deposit });
        }

        let max_tasks = self.daily_limit(tier);
        if log.counter >= max_tasks {
            return Err(AppError::DailyLimitReached { limit: max_tasks });
        }

        let wait_seconds = self.wait_seconds(&log, now);
        if wait_seconds > 0 {
            tracing::warn!("Task claim by {} rate limited, {}s remaining", user_id, wait_seconds);
            return Err(AppError::RateLimited { retry_after_secs: wait_seconds });
        }

        let log = logs.record_claim(log, now).await?;

        // Task rewards are locked but never move the unlock date
        let wallet = wallets.apply(
            wallet,
            BalanceDelta::reward_task(tier.reward_per_task),
            None,
            now
        ).await?;

        let new_tx = NewTransaction::new(
            user_id,
            TxType::RewardTask,
            tier.reward_per_task,
            TxStatus::Success
        ).notes(Some(format!("Task {}/{} on {}", log.counter, max_tasks, log.date)));

        let reward_tx = TransactionRepository::new(&txn).create(new_tx, now).await?;
        txn.commit().await?;

        tracing::info!(
            "Task {}/{} claimed by {}, reward {}",
            log.counter,
            max_tasks,
            user_id,
            tier.reward_per_task
        );

        Ok(ClaimReceipt {
            counter: log.counter,
            max_tasks,
            reward: tier.reward_per_task,
            transaction: reward_tx,
            wallet,
        })
    }

    fn daily_limit(&self, tier: &TierDefinition) -> i32 {
        tier.max_tasks.min(self.rules.max_tasks_per_day)
    }

    fn wait_seconds(&self, log: &task_log::Model, now: DateTime<Utc>) -> i64 {
        remaining_wait_seconds(log.last_claim, now, self.rules.task_rate_limit_seconds)
    }
}

/// Tier of an activated member; None for free or banned accounts.
fn member_tier(user: &user::Model) -> Option<&'static TierDefinition> {
    if !user.is_member() {
        return None;
    }

    tiers::tier_for_level(user.tier_level).ok()
}

/// Whole seconds left before another claim is allowed, rounded up.
fn remaining_wait_seconds(
    last_claim: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    rate_limit_seconds: i64
) -> i64 {
    let Some(last_claim) = last_claim else {
        return 0;
    };

    let elapsed_ms = (now - last_claim).num_milliseconds();
    let remaining_ms = rate_limit_seconds * 1000 - elapsed_ms;

    if remaining_ms <= 0 {
        0
    } else {
        (remaining_ms + 999) / 1000
    }
}
