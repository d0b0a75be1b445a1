use std::sync::Arc;

use axum::{
    extract::{ FromRequestParts, State },
    http::request::Parts,
    response::{ IntoResponse, Response },
    routing::{ get, post, put },
    Json,
    Router,
};
use serde::{ Deserialize, Serialize };

pub mod account;
pub mod admin;
pub mod funds;
pub mod reference;
pub mod tasks;

use crate::config::SettlementRules;
use crate::db::TransactionFilter;
use crate::enums::{ TxStatus, TxType };
use crate::error::AppError;
use crate::services::{
    AccountService,
    BalanceEngine,
    LedgerService,
    NetworkService,
    ReferenceService,
    TaskCounter,
};

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub balance_engine: Arc<BalanceEngine>,
    pub task_counter: Arc<TaskCounter>,
    pub network_service: Arc<NetworkService>,
    pub ledger_service: Arc<LedgerService>,
    pub reference_service: Arc<ReferenceService>,
    pub rules: SettlementRules,
    pub admin_token: Arc<str>,
}

impl AppState {
    pub fn new(
        db: sea_orm::DatabaseConnection,
        rules: SettlementRules,
        admin_token: &str
    ) -> Self {
        Self {
            account_service: Arc::new(AccountService::new(db.clone())),
            balance_engine: Arc::new(BalanceEngine::new(db.clone(), rules)),
            task_counter: Arc::new(TaskCounter::new(db.clone(), rules)),
            network_service: Arc::new(NetworkService::new(db.clone())),
            ledger_service: Arc::new(LedgerService::new(db.clone())),
            reference_service: Arc::new(ReferenceService::new(db)),
            rules,
            admin_token: Arc::from(admin_token),
        }
    }
}

/// Envelope shared by every endpoint.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub type ApiResult<T> = crate::error::Result<ApiResponse<T>>;

/// Caller identity as asserted by the upstream identity provider.
pub struct CurrentUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts.headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser(user_id.to_string()))
    }
}

/// Gate for the admin surface: the `x-admin-token` header must match.
pub struct AdminGuard;

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState
    ) -> Result<Self, Self::Rejection> {
        let token = parts.headers.get("x-admin-token").and_then(|v| v.to_str().ok());

        match token {
            Some(token) if token == state.admin_token.as_ref() => Ok(AdminGuard),
            _ => {
                tracing::warn!("Rejected admin request to {}", parts.uri.path());
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub tx_type: Option<TxType>,
    pub status: Option<TxStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl From<TransactionQuery> for TransactionFilter {
    fn from(query: TransactionQuery) -> Self {
        TransactionFilter {
            user_id: None,
            tx_type: query.tx_type,
            status: query.status,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/register", post(account::register))
        .route("/me/wallet", get(account::get_wallet))
        .route("/me/transactions", get(account::get_transactions))
        .route("/me/network", get(account::get_network))
        .route("/tasks", get(reference::list_tasks))
        .route("/tasks/status", get(tasks::get_status))
        .route("/tasks/claim", post(tasks::claim))
        .route("/deposits", post(funds::submit_deposit))
        .route("/withdrawals", post(funds::submit_withdrawal))
        .route("/tiers", get(reference::list_tiers))
        .route("/banks", get(reference::list_banks))
        .route("/contacts", get(reference::list_contacts));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", get(admin::get_user))
        .route("/users/{id}/ban", post(admin::ban_user))
        .route("/users/{id}/unban", post(admin::unban_user))
        .route("/users/{id}/reconcile", get(admin::reconcile_user))
        .route("/transactions", get(admin::list_transactions))
        .route("/transactions/{id}", get(admin::get_transaction))
        .route("/deposits/{id}/approve", post(admin::approve_deposit))
        .route("/deposits/{id}/reject", post(admin::reject_deposit))
        .route("/withdrawals/{id}/approve", post(admin::approve_withdrawal))
        .route("/withdrawals/{id}/reject", post(admin::reject_withdrawal))
        .route("/adjustments", post(admin::manual_adjustment))
        .route("/banks", get(reference::admin_list_banks).post(reference::create_bank))
        .route("/banks/{id}", put(reference::update_bank).delete(reference::delete_bank))
        .route("/contacts", get(reference::admin_list_contacts).post(reference::create_contact))
        .route("/contacts/{id}", put(reference::update_contact).delete(reference::delete_contact))
        .route("/tasks", get(reference::admin_list_tasks).post(reference::create_task))
        .route("/tasks/{id}", put(reference::update_task).delete(reference::delete_task));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", user_routes)
        .nest("/api/admin", admin_routes)
        .with_state(state)
}

async fn health_check(State(_state): State<AppState>) -> &'static str {
    "OK"
}
