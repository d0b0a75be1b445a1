use chrono::{ DateTime, Utc };
use sea_orm::{
    sea_query::Expr,
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

use crate::db::entity::{ transaction, Transaction };
use crate::enums::{ AdjustmentAction, TxStatus, TxType, WalletType };
use crate::error::{ AppError, Result };

/// A transaction row about to be written.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub tx_type: TxType,
    pub amount: i64,
    pub status: TxStatus,
    pub wallet_type: Option<WalletType>,
    pub adjustment_action: Option<AdjustmentAction>,
    pub proof_image_url: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub account_name: Option<String>,
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn new(user_id: &str, tx_type: TxType, amount: i64, status: TxStatus) -> Self {
        Self {
            user_id: user_id.to_string(),
            tx_type,
            amount,
            status,
            wallet_type: None,
            adjustment_action: None,
            proof_image_url: None,
            bank_name: None,
            bank_account: None,
            account_name: None,
            notes: None,
        }
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }
}

#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub user_id: Option<String>,
    pub tx_type: Option<TxType>,
    pub status: Option<TxStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub struct TransactionRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TransactionRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        new_tx: NewTransaction,
        now: DateTime<Utc>
    ) -> Result<transaction::Model> {
        if new_tx.amount <= 0 {
            return Err(AppError::ValidationError("Amount must be positive".into()));
        }

        let processed_at = if new_tx.status.is_terminal() { Some(now) } else { None };

        let transaction_model = transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_tx.user_id),
            tx_type: Set(new_tx.tx_type.as_str().to_string()),
            amount: Set(new_tx.amount),
            status: Set(new_tx.status.as_str().to_string()),
            wallet_type: Set(new_tx.wallet_type.map(|w| w.as_str().to_string())),
            adjustment_action: Set(new_tx.adjustment_action.map(|a| a.as_str().to_string())),
            proof_image_url: Set(new_tx.proof_image_url),
            bank_name: Set(new_tx.bank_name),
            bank_account: Set(new_tx.bank_account),
            account_name: Set(new_tx.account_name),
            notes: Set(new_tx.notes),
            rejected_reason: Set(None),
            processed_at: Set(processed_at),
            created_at: Set(now),
        };

        Ok(transaction_model.insert(self.conn).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<transaction::Model> {
        Transaction::find_by_id(id)
            .one(self.conn).await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {}", id)))
    }

    pub async fn lock_by_id(&self, id: Uuid) -> Result<transaction::Model> {
        Transaction::find_by_id(id)
            .lock_exclusive()
            .one(self.conn).await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {}", id)))
    }

    /// Moves a PENDING row to a terminal status. The status guard in the
    /// UPDATE makes the transition exactly-once even without a row lock.
    pub async fn settle(
        &self,
        id: Uuid,
        status: TxStatus,
        rejected_reason: Option<String>,
        now: DateTime<Utc>
    ) -> Result<transaction::Model> {
        if !status.is_terminal() {
            return Err(AppError::ValidationError("Cannot settle to PENDING".into()));
        }

        let result = Transaction::update_many()
            .col_expr(transaction::Column::Status, Expr::value(status.as_str()))
            .col_expr(transaction::Column::RejectedReason, Expr::value(rejected_reason))
            .col_expr(transaction::Column::ProcessedAt, Expr::value(Some(now)))
            .filter(transaction::Column::Id.eq(id))
            .filter(transaction::Column::Status.eq(TxStatus::Pending.as_str()))
            .exec(self.conn).await?;

        if result.rows_affected != 1 {
            return Err(AppError::AlreadyProcessed);
        }

        self.find_by_id(id).await
    }

    pub async fn list(&self, filter: TransactionFilter) -> Result<Vec<transaction::Model>> {
        let mut query = Transaction::find();

        if let Some(user_id) = filter.user_id {
            query = query.filter(transaction::Column::UserId.eq(user_id));
        }
        if let Some(tx_type) = filter.tx_type {
            query = query.filter(transaction::Column::TxType.eq(tx_type.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(transaction::Column::Status.eq(status.as_str()));
        }

        let query = query
            .order_by_desc(transaction::Column::CreatedAt)
            .limit(filter.limit.unwrap_or(50).min(500))
            .offset(filter.offset.unwrap_or(0));

        Ok(query.all(self.conn).await?)
    }

    /// Every row for a user, oldest first. Used for reconciliation.
    pub async fn all_for_user(&self, user_id: &str) -> Result<Vec<transaction::Model>> {
        Ok(
            Transaction::find()
                .filter(transaction::Column::UserId.eq(user_id))
                .order_by_asc(transaction::Column::CreatedAt)
                .all(self.conn).await?
        )
    }
}
