use axum::extract::{Path, Query};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::signal::{self, NewSignal, Signal, SignalStatus, SignalUpdate};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};

#[derive(Debug, Deserialize)]
pub struct SignalListQuery {
    pub status: Option<SignalStatus>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/admin/signals
pub async fn list(RequireAdmin(_): RequireAdmin, Query(query): Query<SignalListQuery>) -> ApiResult<Vec<Signal>> {
    let pool = DatabaseManager::app_pool().await?;
    let list_query = ListQuery { order: query.order, limit: query.limit, offset: query.offset };
    let filter =
        list_query.to_filter("created_at desc", &[("status", query.status.map(|s| json!(s)))]);

    let repository = Repository::<Signal>::new("signals", pool);
    let signals = repository.select_any(filter).await?;
    Ok(ApiResponse::success(signals))
}

/// POST /api/admin/signals - new signals always open as active.
pub async fn create(RequireAdmin(_): RequireAdmin, Json(payload): Json<NewSignal>) -> ApiResult<Signal> {
    if payload.pair.trim().is_empty() {
        return Err(ApiError::validation_error("A currency pair is required", None));
    }

    let pool = DatabaseManager::app_pool().await?;
    let created = signal::insert(&pool, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/signals/:id - price edits and status transitions
/// (close/cancel) share this endpoint.
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<SignalUpdate>,
) -> ApiResult<Signal> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = signal::update(&pool, id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/signals/:id
pub async fn remove(RequireAdmin(_): RequireAdmin, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    signal::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
