use axum::extract::Path;
use axum::response::Json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::media::{self, BrokerMedia, BrokerMediaUpdate, NewBrokerMedia};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequireBroker};

/// GET /api/broker/media - the caller's media, deleted items excluded.
pub async fn list(RequireBroker(identity): RequireBroker) -> ApiResult<Vec<BrokerMedia>> {
    let pool = DatabaseManager::app_pool().await?;
    let items = media::list_for_broker(&pool, identity.user_id).await?;
    Ok(ApiResponse::success(items))
}

/// POST /api/broker/media - register an uploaded object as a media item.
/// The file itself goes through POST /api/media/:bucket first.
pub async fn create(
    RequireBroker(identity): RequireBroker,
    Json(payload): Json<NewBrokerMedia>,
) -> ApiResult<BrokerMedia> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation_error("A title is required", None));
    }
    if payload.media_url.trim().is_empty() {
        return Err(ApiError::validation_error("A media URL is required", None));
    }

    let pool = DatabaseManager::app_pool().await?;
    let created = media::insert(&pool, identity.user_id, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/broker/media/:id
pub async fn update(
    RequireBroker(identity): RequireBroker,
    Path(id): Path<Uuid>,
    Json(patch): Json<BrokerMediaUpdate>,
) -> ApiResult<BrokerMedia> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = media::update_owned(&pool, identity.user_id, id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/broker/media/:id - soft delete; the row keeps its stats and
/// can be restored.
pub async fn remove(RequireBroker(identity): RequireBroker, Path(id): Path<Uuid>) -> ApiResult<BrokerMedia> {
    let pool = DatabaseManager::app_pool().await?;
    let deleted = media::soft_delete_owned(&pool, identity.user_id, id).await?;
    Ok(ApiResponse::success(deleted))
}

/// POST /api/broker/media/:id/restore
pub async fn restore(RequireBroker(identity): RequireBroker, Path(id): Path<Uuid>) -> ApiResult<BrokerMedia> {
    let pool = DatabaseManager::app_pool().await?;
    let restored = media::restore_owned(&pool, identity.user_id, id).await?;
    Ok(ApiResponse::success(restored))
}
