use axum::extract::Query;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::media::BrokerMedia;
use crate::database::Repository;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};

#[derive(Debug, Deserialize)]
pub struct MediaListQuery {
    pub broker_id: Option<Uuid>,
    /// Include soft-deleted items; moderation needs to see what brokers
    /// removed.
    pub include_deleted: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/admin/media - oversight view across all brokers' media.
pub async fn list(
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<MediaListQuery>,
) -> ApiResult<Vec<BrokerMedia>> {
    let pool = DatabaseManager::app_pool().await?;

    let mut repository = Repository::<BrokerMedia>::new("broker_media", pool);
    if !query.include_deleted.unwrap_or(false) {
        repository = repository.with_soft_delete("deleted_at");
    }

    let list_query = ListQuery { order: query.order, limit: query.limit, offset: query.offset };
    let filter = list_query
        .to_filter("created_at desc", &[("broker_id", query.broker_id.map(|id| json!(id)))]);

    let items = repository.select_any(filter).await?;
    Ok(ApiResponse::success(items))
}
