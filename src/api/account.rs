use axum::{ extract::{ Query, State }, Json };

use crate::db::entity::transaction;
use crate::services::account_service::{ Account, RegisterRequest };
use crate::services::ledger_service::WalletSummary;
use crate::services::network_service::{ NetworkStats, ReferralSummary };

use super::{ ApiResponse, ApiResult, AppState, CurrentUser, TransactionQuery };

pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<RegisterRequest>
) -> ApiResult<Account> {
    let account = state.account_service.register(&user_id, request, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("Registration successful", account))
}

pub async fn get_wallet(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser
) -> ApiResult<WalletSummary> {
    let summary = state.ledger_service.wallet_summary(&user_id, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("Wallet retrieved", summary))
}

pub async fn get_transactions(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<TransactionQuery>
) -> ApiResult<Vec<transaction::Model>> {
    let transactions = state.ledger_service.user_transactions(&user_id, query.into()).await?;

    Ok(ApiResponse::ok("Transactions retrieved", transactions))
}

#[derive(serde::Serialize)]
pub struct NetworkResponse {
    #[serde(flatten)]
    pub stats: NetworkStats,
    pub referrals: Vec<ReferralSummary>,
}

pub async fn get_network(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser
) -> ApiResult<NetworkResponse> {
    let stats = state.network_service.stats(&user_id).await?;
    let referrals = state.network_service
        .direct_referrals(&user_id).await?
        .into_iter()
        .map(ReferralSummary::from)
        .collect();

    Ok(ApiResponse::ok("Network retrieved", NetworkResponse { stats, referrals }))
}
