use axum::extract::{Path, Query};
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseManager;
use crate::database::models::broker::{self, Broker, BrokerUpdate, NewBroker};
use crate::database::Repository;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};
use crate::services::account_service;

/// GET /api/admin/brokers
pub async fn list(RequireAdmin(_): RequireAdmin, Query(query): Query<ListQuery>) -> ApiResult<Vec<Broker>> {
    let pool = DatabaseManager::app_pool().await?;
    let repository = Repository::<Broker>::new("brokers", pool);
    let brokers = repository.select_any(query.to_filter("created_at desc", &[])).await?;
    Ok(ApiResponse::success(brokers))
}

/// POST /api/admin/brokers - create the broker's login account (broker role)
/// and its public listing in one request, mirroring the onboarding flow.
pub async fn create(RequireAdmin(_): RequireAdmin, Json(payload): Json<NewBroker>) -> ApiResult<Broker> {
    let pool = DatabaseManager::app_pool().await?;

    let account = account_service::provision_account(
        &pool,
        payload.email.trim(),
        payload.name.trim(),
        &payload.password,
        Role::Broker,
    )
    .await?;

    let created = broker::insert(&pool, &payload, account.id).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/brokers/:id
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<BrokerUpdate>,
) -> ApiResult<Broker> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = broker::update(&pool, id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/brokers/:id
pub async fn remove(RequireAdmin(_): RequireAdmin, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    broker::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
