use axum::extract::{Path, Query};
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseManager;
use crate::database::models::account::{AccountStatus, UserProfile};
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};
use crate::services::account_service::{self, AccountView};

#[derive(Debug, Deserialize)]
pub struct StaffQuery {
    /// Restrict the listing to one role; all staff otherwise.
    pub role: Option<Role>,
}

/// GET /api/admin/staff - profile rows for every account, filterable by role.
pub async fn list(RequireAdmin(_): RequireAdmin, Query(query): Query<StaffQuery>) -> ApiResult<Vec<UserProfile>> {
    let pool = DatabaseManager::app_pool().await?;
    let staff = account_service::list_staff(&pool, query.role).await?;
    Ok(ApiResponse::success(staff))
}

#[derive(Debug, Deserialize)]
pub struct NewStaff {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// POST /api/admin/staff - provision a staff account with any role,
/// including admin. This is the only way admin accounts come into being.
pub async fn create(RequireAdmin(_): RequireAdmin, Json(payload): Json<NewStaff>) -> ApiResult<AccountView> {
    let pool = DatabaseManager::app_pool().await?;
    let account = account_service::provision_account(
        &pool,
        payload.email.trim(),
        payload.username.trim(),
        &payload.password,
        payload.role,
    )
    .await?;
    Ok(ApiResponse::created(account))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: AccountStatus,
}

/// PUT /api/admin/staff/:id/status - activate or deactivate an account.
/// Deactivated accounts keep their rows but can no longer sign in.
pub async fn set_status(
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> ApiResult<UserProfile> {
    let pool = DatabaseManager::app_pool().await?;
    let profile = account_service::set_staff_status(&pool, id, change.status).await?;
    Ok(ApiResponse::success(profile))
}
