use axum::{ extract::{ Path, Query, State }, Json };
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::{ transaction, user };
use crate::services::account_service::Account;
use crate::services::balance_engine::{ Adjustment, AdjustmentRequest, Settlement };
use crate::services::ledger_service::Reconciliation;

use super::{ AdminGuard, ApiResponse, ApiResult, AppState, TransactionQuery };

#[derive(Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

pub async fn list_users(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>
) -> ApiResult<Vec<Account>> {
    let accounts = state.account_service.list_accounts(page.limit, page.offset).await?;

    Ok(ApiResponse::ok("Users retrieved", accounts))
}

pub async fn get_user(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(user_id): Path<String>
) -> ApiResult<Account> {
    let account = state.account_service.get_account(&user_id).await?;

    Ok(ApiResponse::ok("User retrieved", account))
}

pub async fn ban_user(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(user_id): Path<String>
) -> ApiResult<user::Model> {
    let user = state.account_service.ban(&user_id, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("User banned", user))
}

pub async fn unban_user(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(user_id): Path<String>
) -> ApiResult<user::Model> {
    let user = state.account_service.unban(&user_id, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("User unbanned", user))
}

pub async fn reconcile_user(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(user_id): Path<String>
) -> ApiResult<Reconciliation> {
    let report = state.ledger_service.reconcile(&user_id).await?;
    let message = if report.balanced { "Ledger balanced" } else { "Ledger mismatch" };

    Ok(ApiResponse::ok(message, report))
}

pub async fn list_transactions(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>
) -> ApiResult<Vec<transaction::Model>> {
    let transactions = state.ledger_service.list_transactions(query.into()).await?;

    Ok(ApiResponse::ok("Transactions retrieved", transactions))
}

pub async fn get_transaction(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>
) -> ApiResult<transaction::Model> {
    let transaction = state.ledger_service.get_transaction(id).await?;

    Ok(ApiResponse::ok("Transaction retrieved", transaction))
}

pub async fn approve_deposit(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>
) -> ApiResult<Settlement> {
    let settlement = state.balance_engine.approve_deposit(id, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("Deposit approved", settlement))
}

pub async fn reject_deposit(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectRequest>
) -> ApiResult<transaction::Model> {
    let rejected = state.balance_engine.reject_deposit(id, request.reason, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("Deposit rejected", rejected))
}

pub async fn approve_withdrawal(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>
) -> ApiResult<transaction::Model> {
    let approved = state.balance_engine.approve_withdrawal(id, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("Withdrawal approved", approved))
}

pub async fn reject_withdrawal(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectRequest>
) -> ApiResult<Settlement> {
    let settlement = state.balance_engine.reject_withdrawal(
        id,
        request.reason,
        chrono::Utc::now()
    ).await?;

    Ok(ApiResponse::ok("Withdrawal rejected and refunded", settlement))
}

pub async fn manual_adjustment(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Json(request): Json<AdjustmentRequest>
) -> ApiResult<Adjustment> {
    let adjustment = state.balance_engine.manual_adjustment(request, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("Adjustment recorded", adjustment))
}
