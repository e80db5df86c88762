use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::{Localized, LocalizedList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum CourseType {
    Free,
    Premium,
    Regular,
}

/// A trainer's course. Rows are owned by the trainer account referenced by
/// `trainer_id`; the trainer route group only ever reads and writes its own.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub title: Json<Localized>,
    pub description: Json<Localized>,
    pub trailer_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub course_type: CourseType,
    pub order_index: i32,
    pub price_iqd: Decimal,
    pub original_price_iqd: Option<Decimal>,
    pub learning_points: Json<LocalizedList>,
    pub total_sections: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub title: Localized,
    pub description: Localized,
    pub trailer_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub course_type: CourseType,
    pub order_index: Option<i32>,
    pub price_iqd: Option<Decimal>,
    pub original_price_iqd: Option<Decimal>,
    pub learning_points: Option<LocalizedList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseUpdate {
    pub title: Option<Localized>,
    pub description: Option<Localized>,
    pub trailer_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub course_type: Option<CourseType>,
    pub order_index: Option<i32>,
    pub price_iqd: Option<Decimal>,
    pub original_price_iqd: Option<Decimal>,
    pub learning_points: Option<LocalizedList>,
    pub total_sections: Option<i32>,
}

pub async fn insert(pool: &PgPool, trainer_id: Uuid, new: &NewCourse) -> Result<Course, DatabaseError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (
            id, trainer_id, title, description, trailer_url, thumbnail_url,
            course_type, order_index, price_iqd, original_price_iqd,
            learning_points, total_sections, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(trainer_id)
    .bind(Json(&new.title))
    .bind(Json(&new.description))
    .bind(&new.trailer_url)
    .bind(&new.thumbnail_url)
    .bind(new.course_type)
    .bind(new.order_index.unwrap_or(0))
    .bind(new.price_iqd.unwrap_or_default())
    .bind(new.original_price_iqd)
    .bind(Json(new.learning_points.clone().unwrap_or_default()))
    .fetch_one(pool)
    .await?;

    Ok(course)
}

/// Update a course, but only when it belongs to `trainer_id`. A course owned
/// by someone else reports NotFound rather than Forbidden so ids cannot be
/// probed across trainers.
pub async fn update_owned(
    pool: &PgPool,
    trainer_id: Uuid,
    id: Uuid,
    patch: &CourseUpdate,
) -> Result<Course, DatabaseError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        UPDATE courses SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            trailer_url = COALESCE($5, trailer_url),
            thumbnail_url = COALESCE($6, thumbnail_url),
            course_type = COALESCE($7, course_type),
            order_index = COALESCE($8, order_index),
            price_iqd = COALESCE($9, price_iqd),
            original_price_iqd = COALESCE($10, original_price_iqd),
            learning_points = COALESCE($11, learning_points),
            total_sections = COALESCE($12, total_sections),
            updated_at = now()
        WHERE id = $1 AND trainer_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(trainer_id)
    .bind(patch.title.as_ref().map(Json))
    .bind(patch.description.as_ref().map(Json))
    .bind(&patch.trailer_url)
    .bind(&patch.thumbnail_url)
    .bind(patch.course_type)
    .bind(patch.order_index)
    .bind(patch.price_iqd)
    .bind(patch.original_price_iqd)
    .bind(patch.learning_points.as_ref().map(Json))
    .bind(patch.total_sections)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Course {} not found", id)))?;

    Ok(course)
}

pub async fn delete_owned(pool: &PgPool, trainer_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1 AND trainer_id = $2")
        .bind(id)
        .bind(trainer_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Course {} not found", id)));
    }
    Ok(())
}

pub async fn list_for_trainer(pool: &PgPool, trainer_id: Uuid) -> Result<Vec<Course>, DatabaseError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT * FROM courses WHERE trainer_id = $1 ORDER BY created_at DESC",
    )
    .bind(trainer_id)
    .fetch_all(pool)
    .await?;
    Ok(courses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_type_serde_tags() {
        assert_eq!(serde_json::to_string(&CourseType::Premium).unwrap(), "\"premium\"");
        let parsed: CourseType = serde_json::from_str("\"free\"").unwrap();
        assert_eq!(parsed, CourseType::Free);
        assert!(serde_json::from_str::<CourseType>("\"gold\"").is_err());
    }
}
