use chrono::{ DateTime, Utc };
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ wallet, Wallet };
use crate::error::{ AppError, Result };

/// Signed changes to apply to a wallet row. Unset fields stay as they are.
#[derive(Debug, Default, Clone, Copy)]
pub struct BalanceDelta {
    pub deposit: i64,
    pub reward_task: i64,
    pub matching_lock: i64,
    pub available: i64,
}

impl BalanceDelta {
    pub fn deposit(amount: i64) -> Self {
        Self { deposit: amount, ..Default::default() }
    }

    pub fn reward_task(amount: i64) -> Self {
        Self { reward_task: amount, ..Default::default() }
    }

    pub fn available(amount: i64) -> Self {
        Self { available: amount, ..Default::default() }
    }
}

pub struct WalletRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> WalletRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create_for_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<wallet::Model> {
        let wallet = wallet::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            balance_deposit: Set(0),
            balance_reward_task: Set(0),
            balance_matching_lock: Set(0),
            balance_available: Set(0),
            unlock_date: Set(None),
            updated_at: Set(now),
        };

        Ok(wallet.insert(self.conn).await?)
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<wallet::Model> {
        Wallet::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(self.conn).await?
            .ok_or_else(|| AppError::NotFound(format!("Wallet for user {}", user_id)))
    }

    pub async fn find_by_users(&self, user_ids: Vec<String>) -> Result<Vec<wallet::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        Ok(Wallet::find().filter(wallet::Column::UserId.is_in(user_ids)).all(self.conn).await?)
    }

    /// Loads the wallet row with an exclusive row lock held until the
    /// surrounding transaction ends.
    pub async fn lock_by_user(&self, user_id: &str) -> Result<wallet::Model> {
        Wallet::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(self.conn).await?
            .ok_or_else(|| AppError::NotFound(format!("Wallet for user {}", user_id)))
    }

    /// Locks two wallets in ascending user id order so concurrent units that
    /// touch the same pair cannot deadlock.
    pub async fn lock_pair(
        &self,
        first: &str,
        second: &str
    ) -> Result<(wallet::Model, wallet::Model)> {
        if first == second {
            return Err(AppError::ValidationError("A wallet cannot be paired with itself".into()));
        }

        let mut wallets = Wallet::find()
            .filter(wallet::Column::UserId.is_in([first, second]))
            .order_by_asc(wallet::Column::UserId)
            .lock_exclusive()
            .all(self.conn).await?;

        let mut take = |user_id: &str| -> Result<wallet::Model> {
            let idx = wallets
                .iter()
                .position(|w| w.user_id == user_id)
                .ok_or_else(|| AppError::NotFound(format!("Wallet for user {}", user_id)))?;
            Ok(wallets.swap_remove(idx))
        };

        let first_wallet = take(first)?;
        let second_wallet = take(second)?;

        Ok((first_wallet, second_wallet))
    }

    /// Applies `delta`, refusing any result below zero.
    pub async fn apply(
        &self,
        wallet: wallet::Model,
        delta: BalanceDelta,
        unlock_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>
    ) -> Result<wallet::Model> {
        let deposit = checked_balance(wallet.balance_deposit, delta.deposit)?;
        let reward_task = checked_balance(wallet.balance_reward_task, delta.reward_task)?;
        let matching_lock = checked_balance(wallet.balance_matching_lock, delta.matching_lock)?;
        let available = checked_balance(wallet.balance_available, delta.available)?;

        let mut active: wallet::ActiveModel = wallet.into();
        active.balance_deposit = Set(deposit);
        active.balance_reward_task = Set(reward_task);
        active.balance_matching_lock = Set(matching_lock);
        active.balance_available = Set(available);
        if let Some(unlock_date) = unlock_date {
            active.unlock_date = Set(Some(unlock_date));
        }
        active.updated_at = Set(now);

        Ok(active.update(self.conn).await?)
    }
}

fn checked_balance(current: i64, delta: i64) -> Result<i64> {
    let next = current
        .checked_add(delta)
        .ok_or_else(|| AppError::ValidationError("Balance overflow".into()))?;

    if next < 0 {
        return Err(AppError::InsufficientBalance);
    }

    Ok(next)
}
