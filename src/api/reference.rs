use axum::{ extract::{ Path, State }, Json };
use uuid::Uuid;

use crate::db::entity::{ company_bank, contact_center, task_config };
use crate::services::reference_service::{ BankInput, ContactInput, TaskConfigInput };
use crate::tiers::{ self, TierDefinition };

use super::{ AdminGuard, ApiResponse, ApiResult, AppState };

#[derive(serde::Serialize)]
pub struct TierResponse {
    #[serde(flatten)]
    pub tier: TierDefinition,
    pub daily_income: i64,
    pub lock_period_days: i64,
}

pub async fn list_tiers(State(state): State<AppState>) -> ApiResult<Vec<TierResponse>> {
    let tiers = tiers
        ::all()
        .iter()
        .map(|tier| TierResponse {
            tier: *tier,
            daily_income: tier.daily_income(),
            lock_period_days: state.rules.lock_period_days,
        })
        .collect();

    Ok(ApiResponse::ok("Tiers retrieved", tiers))
}

pub async fn list_banks(State(state): State<AppState>) -> ApiResult<Vec<company_bank::Model>> {
    let banks = state.reference_service.list_banks(true).await?;
    Ok(ApiResponse::ok("Banks retrieved", banks))
}

pub async fn list_contacts(State(state): State<AppState>) -> ApiResult<Vec<contact_center::Model>> {
    let contacts = state.reference_service.list_contacts(true).await?;
    Ok(ApiResponse::ok("Contacts retrieved", contacts))
}

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Vec<task_config::Model>> {
    let tasks = state.reference_service.list_tasks(true).await?;
    Ok(ApiResponse::ok("Tasks retrieved", tasks))
}

// ─── Admin ───────────────────────────────────────────────────────────

pub async fn admin_list_banks(
    _admin: AdminGuard,
    State(state): State<AppState>
) -> ApiResult<Vec<company_bank::Model>> {
    let banks = state.reference_service.list_banks(false).await?;
    Ok(ApiResponse::ok("Banks retrieved", banks))
}

pub async fn create_bank(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Json(input): Json<BankInput>
) -> ApiResult<company_bank::Model> {
    let bank = state.reference_service.create_bank(input).await?;
    Ok(ApiResponse::ok("Bank created", bank))
}

pub async fn update_bank(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<BankInput>
) -> ApiResult<company_bank::Model> {
    let bank = state.reference_service.update_bank(id, input).await?;
    Ok(ApiResponse::ok("Bank updated", bank))
}

pub async fn delete_bank(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>
) -> ApiResult<()> {
    state.reference_service.delete_bank(id).await?;
    Ok(ApiResponse::ok("Bank deleted", ()))
}

pub async fn admin_list_contacts(
    _admin: AdminGuard,
    State(state): State<AppState>
) -> ApiResult<Vec<contact_center::Model>> {
    let contacts = state.reference_service.list_contacts(false).await?;
    Ok(ApiResponse::ok("Contacts retrieved", contacts))
}

pub async fn create_contact(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Json(input): Json<ContactInput>
) -> ApiResult<contact_center::Model> {
    let contact = state.reference_service.create_contact(input).await?;
    Ok(ApiResponse::ok("Contact created", contact))
}

pub async fn update_contact(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ContactInput>
) -> ApiResult<contact_center::Model> {
    let contact = state.reference_service.update_contact(id, input).await?;
    Ok(ApiResponse::ok("Contact updated", contact))
}

pub async fn delete_contact(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>
) -> ApiResult<()> {
    state.reference_service.delete_contact(id).await?;
    Ok(ApiResponse::ok("Contact deleted", ()))
}

pub async fn admin_list_tasks(
    _admin: AdminGuard,
    State(state): State<AppState>
) -> ApiResult<Vec<task_config::Model>> {
    let tasks = state.reference_service.list_tasks(false).await?;
    Ok(ApiResponse::ok("Tasks retrieved", tasks))
}

pub async fn create_task(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Json(input): Json<TaskConfigInput>
) -> ApiResult<task_config::Model> {
    let task = state.reference_service.create_task(input).await?;
    Ok(ApiResponse::ok("Task created", task))
}

pub async fn update_task(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TaskConfigInput>
) -> ApiResult<task_config::Model> {
    let task = state.reference_service.update_task(id, input).await?;
    Ok(ApiResponse::ok("Task updated", task))
}

pub async fn delete_task(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<Uuid>
) -> ApiResult<()> {
    state.reference_service.delete_task(id).await?;
    Ok(ApiResponse::ok("Task deleted", ()))
}
