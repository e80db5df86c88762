use axum::response::Json;

use crate::database::manager::DatabaseManager;
use crate::database::models::broker::{self, Broker, BrokerUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequireBroker};

/// GET /api/broker/profile - the caller's own brokerage listing.
pub async fn get(RequireBroker(identity): RequireBroker) -> ApiResult<Broker> {
    let pool = DatabaseManager::app_pool().await?;
    let listing = broker::find_by_user(&pool, identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No broker listing for this account"))?;
    Ok(ApiResponse::success(listing))
}

/// PATCH /api/broker/profile
pub async fn update(
    RequireBroker(identity): RequireBroker,
    Json(patch): Json<BrokerUpdate>,
) -> ApiResult<Broker> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = broker::update_own(&pool, identity.user_id, &patch).await?;
    Ok(ApiResponse::success(updated))
}
