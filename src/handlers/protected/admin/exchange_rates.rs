use axum::extract::{Path, Query};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::exchange_rate::{self, City, CityExchangeRate, NewCityExchangeRate};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};

#[derive(Debug, Deserialize)]
pub struct RateListQuery {
    pub city: Option<City>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/admin/exchange-rates - newest quotes first, optionally narrowed
/// to one city.
pub async fn list(
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<RateListQuery>,
) -> ApiResult<Vec<CityExchangeRate>> {
    let pool = DatabaseManager::app_pool().await?;
    let list_query = ListQuery { order: query.order, limit: query.limit, offset: query.offset };
    let filter = list_query.to_filter("quoted_at desc", &[("city", query.city.map(|c| json!(c)))]);

    let repository = Repository::<CityExchangeRate>::new("city_exchange_rates", pool);
    let rates = repository.select_any(filter).await?;
    Ok(ApiResponse::success(rates))
}

/// POST /api/admin/exchange-rates
pub async fn create(
    RequireAdmin(_): RequireAdmin,
    Json(payload): Json<NewCityExchangeRate>,
) -> ApiResult<CityExchangeRate> {
    validate_rate(&payload)?;
    let pool = DatabaseManager::app_pool().await?;
    let created = exchange_rate::insert(&pool, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// PUT /api/admin/exchange-rates/:id - full re-quote; the timestamp always
/// moves to now.
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewCityExchangeRate>,
) -> ApiResult<CityExchangeRate> {
    validate_rate(&payload)?;
    let pool = DatabaseManager::app_pool().await?;
    let updated = exchange_rate::update(&pool, id, &payload).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/exchange-rates/:id
pub async fn remove(RequireAdmin(_): RequireAdmin, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    exchange_rate::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}

fn validate_rate(payload: &NewCityExchangeRate) -> Result<(), ApiError> {
    if payload.usd_to_iqd_rate <= rust_decimal::Decimal::ZERO {
        return Err(ApiError::validation_error("The exchange rate must be positive", None));
    }
    Ok(())
}
