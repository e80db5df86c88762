use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::Localized;

/// Home-screen carousel entry. `display_order` drives the public ordering;
/// inactive items stay in the table but are filtered out by the apps.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CarouselItem {
    pub id: Uuid,
    pub title: Json<Localized>,
    pub image_url: String,
    pub link: Option<String>,
    pub is_external: bool,
    pub active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCarouselItem {
    pub title: Localized,
    pub image_url: String,
    pub link: Option<String>,
    pub is_external: Option<bool>,
    pub active: Option<bool>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarouselItemUpdate {
    pub title: Option<Localized>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub is_external: Option<bool>,
    pub active: Option<bool>,
    pub display_order: Option<i32>,
}

pub async fn insert(pool: &PgPool, new: &NewCarouselItem) -> Result<CarouselItem, DatabaseError> {
    let item = sqlx::query_as::<_, CarouselItem>(
        r#"
        INSERT INTO carousel_items (
            id, title, image_url, link, is_external, active, display_order, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(Json(&new.title))
    .bind(&new.image_url)
    .bind(&new.link)
    .bind(new.is_external.unwrap_or(false))
    .bind(new.active.unwrap_or(true))
    .bind(new.display_order.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    Ok(item)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &CarouselItemUpdate) -> Result<CarouselItem, DatabaseError> {
    let item = sqlx::query_as::<_, CarouselItem>(
        r#"
        UPDATE carousel_items SET
            title = COALESCE($2, title),
            image_url = COALESCE($3, image_url),
            link = COALESCE($4, link),
            is_external = COALESCE($5, is_external),
            active = COALESCE($6, active),
            display_order = COALESCE($7, display_order),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.title.as_ref().map(Json))
    .bind(&patch.image_url)
    .bind(&patch.link)
    .bind(patch.is_external)
    .bind(patch.active)
    .bind(patch.display_order)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Carousel item {} not found", id)))?;

    Ok(item)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM carousel_items WHERE id = $1").bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Carousel item {} not found", id)));
    }
    Ok(())
}
