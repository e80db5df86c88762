use axum::extract::{Path, Query};
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseManager;
use crate::database::models::trainer::{self, NewTrainer, Trainer, TrainerUpdate};
use crate::database::Repository;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};
use crate::services::account_service;

/// GET /api/admin/trainers
pub async fn list(RequireAdmin(_): RequireAdmin, Query(query): Query<ListQuery>) -> ApiResult<Vec<Trainer>> {
    let pool = DatabaseManager::app_pool().await?;
    let repository = Repository::<Trainer>::new("trainers", pool);
    let trainers = repository.select_any(query.to_filter("created_at desc", &[])).await?;
    Ok(ApiResponse::success(trainers))
}

/// POST /api/admin/trainers - provision the trainer's login account and
/// public profile together.
pub async fn create(RequireAdmin(_): RequireAdmin, Json(payload): Json<NewTrainer>) -> ApiResult<Trainer> {
    let pool = DatabaseManager::app_pool().await?;

    let account = account_service::provision_account(
        &pool,
        payload.email.trim(),
        payload.name.trim(),
        &payload.password,
        Role::Trainer,
    )
    .await?;

    let created = trainer::insert(&pool, &payload, account.id).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/trainers/:id
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<TrainerUpdate>,
) -> ApiResult<Trainer> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = trainer::update(&pool, id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/trainers/:id
pub async fn remove(RequireAdmin(_): RequireAdmin, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    trainer::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
