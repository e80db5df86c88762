use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Trainer {
    pub id: Uuid,
    pub name: String,
    pub experience_years: i32,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub rating: f64,
    pub position: Option<String>,
    pub website_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub youtube_url: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrainer {
    pub name: String,
    pub email: String,
    /// Initial password for the trainer's login account.
    pub password: String,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub position: Option<String>,
    pub website_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub youtube_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainerUpdate {
    pub name: Option<String>,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub position: Option<String>,
    pub website_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub youtube_url: Option<String>,
}

pub async fn insert(pool: &PgPool, new: &NewTrainer, user_id: Uuid) -> Result<Trainer, DatabaseError> {
    let trainer = sqlx::query_as::<_, Trainer>(
        r#"
        INSERT INTO trainers (
            id, name, experience_years, bio, image_url, rating, position,
            website_url, twitter_url, facebook_url, linkedin_url, youtube_url,
            user_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, 0, $6, $7, $8, $9, $10, $11, $12, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(new.experience_years.unwrap_or(0))
    .bind(&new.bio)
    .bind(&new.image_url)
    .bind(&new.position)
    .bind(&new.website_url)
    .bind(&new.twitter_url)
    .bind(&new.facebook_url)
    .bind(&new.linkedin_url)
    .bind(&new.youtube_url)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(trainer)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &TrainerUpdate) -> Result<Trainer, DatabaseError> {
    let trainer = sqlx::query_as::<_, Trainer>(
        r#"
        UPDATE trainers SET
            name = COALESCE($2, name),
            experience_years = COALESCE($3, experience_years),
            bio = COALESCE($4, bio),
            image_url = COALESCE($5, image_url),
            position = COALESCE($6, position),
            website_url = COALESCE($7, website_url),
            twitter_url = COALESCE($8, twitter_url),
            facebook_url = COALESCE($9, facebook_url),
            linkedin_url = COALESCE($10, linkedin_url),
            youtube_url = COALESCE($11, youtube_url),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.name)
    .bind(patch.experience_years)
    .bind(&patch.bio)
    .bind(&patch.image_url)
    .bind(&patch.position)
    .bind(&patch.website_url)
    .bind(&patch.twitter_url)
    .bind(&patch.facebook_url)
    .bind(&patch.linkedin_url)
    .bind(&patch.youtube_url)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Trainer {} not found", id)))?;

    Ok(trainer)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM trainers WHERE id = $1").bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Trainer {} not found", id)));
    }
    Ok(())
}

pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Trainer>, DatabaseError> {
    let trainer = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(trainer)
}

/// Self-service profile edit from the trainer portal; scoped by the owning
/// account, not by row id.
pub async fn update_own(pool: &PgPool, user_id: Uuid, patch: &TrainerUpdate) -> Result<Trainer, DatabaseError> {
    let trainer = sqlx::query_as::<_, Trainer>(
        r#"
        UPDATE trainers SET
            name = COALESCE($2, name),
            experience_years = COALESCE($3, experience_years),
            bio = COALESCE($4, bio),
            image_url = COALESCE($5, image_url),
            position = COALESCE($6, position),
            website_url = COALESCE($7, website_url),
            twitter_url = COALESCE($8, twitter_url),
            facebook_url = COALESCE($9, facebook_url),
            linkedin_url = COALESCE($10, linkedin_url),
            youtube_url = COALESCE($11, youtube_url),
            updated_at = now()
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&patch.name)
    .bind(patch.experience_years)
    .bind(&patch.bio)
    .bind(&patch.image_url)
    .bind(&patch.position)
    .bind(&patch.website_url)
    .bind(&patch.twitter_url)
    .bind(&patch.facebook_url)
    .bind(&patch.linkedin_url)
    .bind(&patch.youtube_url)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("No trainer profile for this account".to_string()))?;

    Ok(trainer)
}
