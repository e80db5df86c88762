use axum::extract::{Path, Query};
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::carousel::{self, CarouselItem, CarouselItemUpdate, NewCarouselItem};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};

/// GET /api/admin/carousel - ordered the way the home screen renders it.
pub async fn list(RequireAdmin(_): RequireAdmin, Query(query): Query<ListQuery>) -> ApiResult<Vec<CarouselItem>> {
    let pool = DatabaseManager::app_pool().await?;
    let repository = Repository::<CarouselItem>::new("carousel_items", pool);
    let items = repository.select_any(query.to_filter("display_order", &[])).await?;
    Ok(ApiResponse::success(items))
}

/// POST /api/admin/carousel
pub async fn create(RequireAdmin(_): RequireAdmin, Json(payload): Json<NewCarouselItem>) -> ApiResult<CarouselItem> {
    if payload.title.is_empty() {
        return Err(ApiError::validation_error("A title is required in at least one language", None));
    }
    if payload.image_url.trim().is_empty() {
        return Err(ApiError::validation_error("An image is required", None));
    }

    let pool = DatabaseManager::app_pool().await?;
    let created = carousel::insert(&pool, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/carousel/:id
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<CarouselItemUpdate>,
) -> ApiResult<CarouselItem> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = carousel::update(&pool, id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/carousel/:id
pub async fn remove(RequireAdmin(_): RequireAdmin, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    carousel::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
