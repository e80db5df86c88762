use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Cities quoted on the exchange-rate board. Stored with their display
/// capitalization; the set is closed so a typo cannot invent a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum City {
    Erbil,
    Sulaymaniyah,
    Mosul,
    Basra,
    Baghdad,
    Duhok,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CityExchangeRate {
    pub id: Uuid,
    pub city: City,
    pub usd_to_iqd_rate: Decimal,
    /// When the quote was taken; refreshed on every update.
    pub quoted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCityExchangeRate {
    pub city: City,
    pub usd_to_iqd_rate: Decimal,
}

pub async fn insert(pool: &PgPool, new: &NewCityExchangeRate) -> Result<CityExchangeRate, DatabaseError> {
    let rate = sqlx::query_as::<_, CityExchangeRate>(
        r#"
        INSERT INTO city_exchange_rates (id, city, usd_to_iqd_rate, quoted_at, created_at)
        VALUES ($1, $2, $3, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.city)
    .bind(new.usd_to_iqd_rate)
    .fetch_one(pool)
    .await?;

    Ok(rate)
}

/// Re-quote an existing row; `quoted_at` always moves forward.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    new: &NewCityExchangeRate,
) -> Result<CityExchangeRate, DatabaseError> {
    let rate = sqlx::query_as::<_, CityExchangeRate>(
        r#"
        UPDATE city_exchange_rates
        SET city = $2, usd_to_iqd_rate = $3, quoted_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(new.city)
    .bind(new.usd_to_iqd_rate)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Exchange rate {} not found", id)))?;

    Ok(rate)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM city_exchange_rates WHERE id = $1").bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Exchange rate {} not found", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_serde_keeps_display_capitalization() {
        assert_eq!(serde_json::to_string(&City::Erbil).unwrap(), "\"Erbil\"");
        let parsed: City = serde_json::from_str("\"Sulaymaniyah\"").unwrap();
        assert_eq!(parsed, City::Sulaymaniyah);
        assert!(serde_json::from_str::<City>("\"erbil\"").is_err());
        assert!(serde_json::from_str::<City>("\"Kirkuk\"").is_err());
    }
}
