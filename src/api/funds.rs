use axum::{ extract::State, Json };

use crate::db::entity::transaction;
use crate::services::balance_engine::{ DepositRequest, WithdrawRequest };

use super::{ ApiResponse, ApiResult, AppState, CurrentUser };

pub async fn submit_deposit(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<DepositRequest>
) -> ApiResult<transaction::Model> {
    let deposit = state.balance_engine.submit_deposit(&user_id, request, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("Deposit submitted and awaiting approval", deposit))
}

pub async fn submit_withdrawal(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<WithdrawRequest>
) -> ApiResult<transaction::Model> {
    let withdrawal = state.balance_engine.submit_withdrawal(
        &user_id,
        request,
        chrono::Utc::now()
    ).await?;

    Ok(ApiResponse::ok("Withdrawal submitted and awaiting approval", withdrawal))
}
