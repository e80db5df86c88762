use axum::response::Json;

use crate::database::manager::DatabaseManager;
use crate::database::models::trainer::{self, Trainer, TrainerUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequireTrainer};

/// GET /api/trainer/profile - the caller's own trainer profile.
pub async fn get(RequireTrainer(identity): RequireTrainer) -> ApiResult<Trainer> {
    let pool = DatabaseManager::app_pool().await?;
    let profile = trainer::find_by_user(&pool, identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No trainer profile for this account"))?;
    Ok(ApiResponse::success(profile))
}

/// PATCH /api/trainer/profile
pub async fn update(
    RequireTrainer(identity): RequireTrainer,
    Json(patch): Json<TrainerUpdate>,
) -> ApiResult<Trainer> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = trainer::update_own(&pool, identity.user_id, &patch).await?;
    Ok(ApiResponse::success(updated))
}
