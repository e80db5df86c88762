use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Brokerage listing managed by admins; `user_id` links to the broker's own
/// login account so the broker portal can find its row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Broker {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub established_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub email: String,
    pub contact_phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub average_rating: f64,
    pub total_ratings: i32,
    pub profile_views: i32,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBroker {
    pub name: String,
    pub email: String,
    /// Initial password for the broker's login account.
    pub password: String,
    pub address: Option<String>,
    pub established_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub contact_phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrokerUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub established_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub contact_phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub async fn insert(pool: &PgPool, new: &NewBroker, user_id: Uuid) -> Result<Broker, DatabaseError> {
    let broker = sqlx::query_as::<_, Broker>(
        r#"
        INSERT INTO brokers (
            id, name, address, established_date, description, logo_url, website,
            email, contact_phone, latitude, longitude,
            average_rating, total_ratings, profile_views, user_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, 0, 0, $12, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.address)
    .bind(new.established_date)
    .bind(&new.description)
    .bind(&new.logo_url)
    .bind(&new.website)
    .bind(&new.email)
    .bind(&new.contact_phone)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(broker)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &BrokerUpdate) -> Result<Broker, DatabaseError> {
    let broker = sqlx::query_as::<_, Broker>(
        r#"
        UPDATE brokers SET
            name = COALESCE($2, name),
            address = COALESCE($3, address),
            established_date = COALESCE($4, established_date),
            description = COALESCE($5, description),
            logo_url = COALESCE($6, logo_url),
            website = COALESCE($7, website),
            contact_phone = COALESCE($8, contact_phone),
            latitude = COALESCE($9, latitude),
            longitude = COALESCE($10, longitude),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.name)
    .bind(&patch.address)
    .bind(patch.established_date)
    .bind(&patch.description)
    .bind(&patch.logo_url)
    .bind(&patch.website)
    .bind(&patch.contact_phone)
    .bind(patch.latitude)
    .bind(patch.longitude)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Broker {} not found", id)))?;

    Ok(broker)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM brokers WHERE id = $1").bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Broker {} not found", id)));
    }
    Ok(())
}

/// The broker portal's own listing, keyed by the account that owns it.
pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Broker>, DatabaseError> {
    let broker = sqlx::query_as::<_, Broker>("SELECT * FROM brokers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(broker)
}

/// Self-service profile edit from the broker portal; scoped by the owning
/// account, not by row id.
pub async fn update_own(pool: &PgPool, user_id: Uuid, patch: &BrokerUpdate) -> Result<Broker, DatabaseError> {
    let broker = sqlx::query_as::<_, Broker>(
        r#"
        UPDATE brokers SET
            name = COALESCE($2, name),
            address = COALESCE($3, address),
            established_date = COALESCE($4, established_date),
            description = COALESCE($5, description),
            logo_url = COALESCE($6, logo_url),
            website = COALESCE($7, website),
            contact_phone = COALESCE($8, contact_phone),
            latitude = COALESCE($9, latitude),
            longitude = COALESCE($10, longitude),
            updated_at = now()
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&patch.name)
    .bind(&patch.address)
    .bind(patch.established_date)
    .bind(&patch.description)
    .bind(&patch.logo_url)
    .bind(&patch.website)
    .bind(&patch.contact_phone)
    .bind(patch.latitude)
    .bind(patch.longitude)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("No broker listing for this account".to_string()))?;

    Ok(broker)
}
