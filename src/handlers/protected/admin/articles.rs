use axum::extract::{Path, Query};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::article::{self, Article, ArticleUpdate, NewArticle};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};

#[derive(Debug, Deserialize)]
pub struct ArticleListQuery {
    pub is_premium: Option<bool>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/admin/articles
pub async fn list(
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<ArticleListQuery>,
) -> ApiResult<Vec<Article>> {
    let pool = DatabaseManager::app_pool().await?;
    let list_query = ListQuery { order: query.order, limit: query.limit, offset: query.offset };
    let filter = list_query
        .to_filter("created_at desc", &[("is_premium", query.is_premium.map(|p| json!(p)))]);

    let repository = Repository::<Article>::new("articles", pool);
    let articles = repository.select_any(filter).await?;
    Ok(ApiResponse::success(articles))
}

/// GET /api/admin/articles/:id
pub async fn get(RequireAdmin(_): RequireAdmin, Path(id): Path<Uuid>) -> ApiResult<Article> {
    let pool = DatabaseManager::app_pool().await?;
    let repository = Repository::<Article>::new("articles", pool);
    let article = repository.select_404(ListQuery::default().to_filter("created_at desc", &[("id", Some(json!(id)))])).await?;
    Ok(ApiResponse::success(article))
}

/// POST /api/admin/articles
pub async fn create(RequireAdmin(_): RequireAdmin, Json(payload): Json<NewArticle>) -> ApiResult<Article> {
    if payload.title.is_empty() || payload.content.is_empty() {
        return Err(ApiError::validation_error(
            "Title and content are required in at least one language",
            None,
        ));
    }

    let pool = DatabaseManager::app_pool().await?;
    let created = article::insert(&pool, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/articles/:id
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<ArticleUpdate>,
) -> ApiResult<Article> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = article::update(&pool, id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/articles/:id
pub async fn remove(RequireAdmin(_): RequireAdmin, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    article::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
