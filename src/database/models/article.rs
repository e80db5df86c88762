use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::Localized;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: Uuid,
    pub title: Json<Localized>,
    pub content: Json<Localized>,
    pub is_premium: bool,
    /// Editorial weight used by the apps to rank the news feed.
    pub importance_rating: i32,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    pub title: Localized,
    pub content: Localized,
    pub is_premium: Option<bool>,
    pub importance_rating: Option<i32>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleUpdate {
    pub title: Option<Localized>,
    pub content: Option<Localized>,
    pub is_premium: Option<bool>,
    pub importance_rating: Option<i32>,
    pub thumbnail_url: Option<String>,
}

pub async fn insert(pool: &PgPool, new: &NewArticle) -> Result<Article, DatabaseError> {
    let article = sqlx::query_as::<_, Article>(
        r#"
        INSERT INTO articles (
            id, title, content, is_premium, importance_rating, thumbnail_url, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(Json(&new.title))
    .bind(Json(&new.content))
    .bind(new.is_premium.unwrap_or(false))
    .bind(new.importance_rating.unwrap_or(0))
    .bind(&new.thumbnail_url)
    .fetch_one(pool)
    .await?;

    Ok(article)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &ArticleUpdate) -> Result<Article, DatabaseError> {
    let article = sqlx::query_as::<_, Article>(
        r#"
        UPDATE articles SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            is_premium = COALESCE($4, is_premium),
            importance_rating = COALESCE($5, importance_rating),
            thumbnail_url = COALESCE($6, thumbnail_url),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.title.as_ref().map(Json))
    .bind(patch.content.as_ref().map(Json))
    .bind(patch.is_premium)
    .bind(patch.importance_rating)
    .bind(&patch.thumbnail_url)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Article {} not found", id)))?;

    Ok(article)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1").bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Article {} not found", id)));
    }
    Ok(())
}
