use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::Localized;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum SignalDirection {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum SignalStatus {
    Active,
    Closed,
    Cancelled,
}

/// Trading signal published to subscribers. Premium signals are only shown
/// to paying users by the consuming apps; this API stores the flag.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Signal {
    pub id: Uuid,
    pub direction: SignalDirection,
    pub pair: String,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub market_analysis: Json<Localized>,
    pub status: SignalStatus,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSignal {
    pub direction: SignalDirection,
    pub pair: String,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub market_analysis: Localized,
    pub is_premium: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalUpdate {
    pub direction: Option<SignalDirection>,
    pub pair: Option<String>,
    pub entry_price: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub market_analysis: Option<Localized>,
    pub status: Option<SignalStatus>,
    pub is_premium: Option<bool>,
}

pub async fn insert(pool: &PgPool, new: &NewSignal) -> Result<Signal, DatabaseError> {
    let signal = sqlx::query_as::<_, Signal>(
        r#"
        INSERT INTO signals (
            id, direction, pair, entry_price, stop_loss, take_profit,
            market_analysis, status, is_premium, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', $8, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.direction)
    .bind(&new.pair)
    .bind(new.entry_price)
    .bind(new.stop_loss)
    .bind(new.take_profit)
    .bind(Json(&new.market_analysis))
    .bind(new.is_premium.unwrap_or(false))
    .fetch_one(pool)
    .await?;

    Ok(signal)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &SignalUpdate) -> Result<Signal, DatabaseError> {
    let signal = sqlx::query_as::<_, Signal>(
        r#"
        UPDATE signals SET
            direction = COALESCE($2, direction),
            pair = COALESCE($3, pair),
            entry_price = COALESCE($4, entry_price),
            stop_loss = COALESCE($5, stop_loss),
            take_profit = COALESCE($6, take_profit),
            market_analysis = COALESCE($7, market_analysis),
            status = COALESCE($8, status),
            is_premium = COALESCE($9, is_premium),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.direction)
    .bind(&patch.pair)
    .bind(patch.entry_price)
    .bind(patch.stop_loss)
    .bind(patch.take_profit)
    .bind(patch.market_analysis.as_ref().map(Json))
    .bind(patch.status)
    .bind(patch.is_premium)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Signal {} not found", id)))?;

    Ok(signal)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM signals WHERE id = $1").bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Signal {} not found", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_enums_use_lowercase_tags() {
        assert_eq!(serde_json::to_string(&SignalDirection::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&SignalStatus::Cancelled).unwrap(), "\"cancelled\"");
        assert!(serde_json::from_str::<SignalStatus>("\"open\"").is_err());
    }
}
