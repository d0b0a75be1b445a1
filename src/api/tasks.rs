use axum::extract::State;

use crate::services::task_counter::{ ClaimReceipt, TaskStatus };

use super::{ ApiResponse, ApiResult, AppState, CurrentUser };

pub async fn get_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser
) -> ApiResult<TaskStatus> {
    let status = state.task_counter.get_status(&user_id, chrono::Utc::now()).await?;

    Ok(ApiResponse::ok("Task status retrieved", status))
}

pub async fn claim(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser
) -> ApiResult<ClaimReceipt> {
    let receipt = state.task_counter.claim(&user_id, chrono::Utc::now()).await?;

    Ok(
        ApiResponse::ok(
            format!("Task {}/{} completed, reward {}", receipt.counter, receipt.max_tasks, receipt.reward),
            receipt
        )
    )
}
