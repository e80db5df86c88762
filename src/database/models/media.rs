use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Image,
    Document,
}

/// A broker's uploaded media item. Soft-deleted via `deleted_at`; default
/// reads exclude deleted rows and restore clears the timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BrokerMedia {
    pub id: Uuid,
    pub broker_id: Uuid,
    pub media_type: MediaType,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub file_size_bytes: Option<i64>,
    pub views_count: i32,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBrokerMedia {
    pub media_type: MediaType,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub file_size_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrokerMediaUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
}

pub async fn insert(pool: &PgPool, broker_id: Uuid, new: &NewBrokerMedia) -> Result<BrokerMedia, DatabaseError> {
    let media = sqlx::query_as::<_, BrokerMedia>(
        r#"
        INSERT INTO broker_media (
            id, broker_id, media_type, title, description, media_url, thumbnail_url,
            duration_seconds, file_size_bytes, views_count, deleted_at, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, NULL, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(broker_id)
    .bind(new.media_type)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.media_url)
    .bind(&new.thumbnail_url)
    .bind(new.duration_seconds)
    .bind(new.file_size_bytes)
    .fetch_one(pool)
    .await?;

    Ok(media)
}

pub async fn update_owned(
    pool: &PgPool,
    broker_id: Uuid,
    id: Uuid,
    patch: &BrokerMediaUpdate,
) -> Result<BrokerMedia, DatabaseError> {
    let media = sqlx::query_as::<_, BrokerMedia>(
        r#"
        UPDATE broker_media SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            thumbnail_url = COALESCE($5, thumbnail_url),
            duration_seconds = COALESCE($6, duration_seconds),
            updated_at = now()
        WHERE id = $1 AND broker_id = $2 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(broker_id)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(&patch.thumbnail_url)
    .bind(patch.duration_seconds)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Media {} not found", id)))?;

    Ok(media)
}

pub async fn soft_delete_owned(pool: &PgPool, broker_id: Uuid, id: Uuid) -> Result<BrokerMedia, DatabaseError> {
    let media = sqlx::query_as::<_, BrokerMedia>(
        r#"
        UPDATE broker_media SET deleted_at = now(), updated_at = now()
        WHERE id = $1 AND broker_id = $2 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(broker_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Media {} not found", id)))?;

    Ok(media)
}

pub async fn restore_owned(pool: &PgPool, broker_id: Uuid, id: Uuid) -> Result<BrokerMedia, DatabaseError> {
    let media = sqlx::query_as::<_, BrokerMedia>(
        r#"
        UPDATE broker_media SET deleted_at = NULL, updated_at = now()
        WHERE id = $1 AND broker_id = $2 AND deleted_at IS NOT NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(broker_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("No deleted media {} to restore", id)))?;

    Ok(media)
}

pub async fn list_for_broker(pool: &PgPool, broker_id: Uuid) -> Result<Vec<BrokerMedia>, DatabaseError> {
    let media = sqlx::query_as::<_, BrokerMedia>(
        r#"
        SELECT * FROM broker_media
        WHERE broker_id = $1 AND deleted_at IS NULL
        ORDER BY created_at DESC
        "#,
    )
    .bind(broker_id)
    .fetch_all(pool)
    .await?;
    Ok(media)
}
