use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::{Localized, LocalizedList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub question: Json<Localized>,
    pub options: Json<LocalizedList>,
    pub correct_option: i32,
    pub points: i32,
    pub difficulty: Difficulty,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuizQuestion {
    pub question: Localized,
    pub options: LocalizedList,
    pub correct_option: i32,
    pub points: Option<i32>,
    pub difficulty: Difficulty,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizQuestionUpdate {
    pub question: Option<Localized>,
    pub options: Option<LocalizedList>,
    pub correct_option: Option<i32>,
    pub points: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub image_url: Option<String>,
}

/// correct_option must index into the option lists.
pub fn validate_correct_option(options: &LocalizedList, correct_option: i32) -> Result<(), String> {
    let len = options.len() as i32;
    if len == 0 {
        return Err("A question needs at least one option".to_string());
    }
    if correct_option < 0 || correct_option >= len {
        return Err(format!("correct_option {} is out of range for {} options", correct_option, len));
    }
    Ok(())
}

pub async fn insert(pool: &PgPool, new: &NewQuizQuestion) -> Result<QuizQuestion, DatabaseError> {
    let question = sqlx::query_as::<_, QuizQuestion>(
        r#"
        INSERT INTO quiz_questions (
            id, question, options, correct_option, points, difficulty, image_url, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(Json(&new.question))
    .bind(Json(&new.options))
    .bind(new.correct_option)
    .bind(new.points.unwrap_or(1))
    .bind(new.difficulty)
    .bind(&new.image_url)
    .fetch_one(pool)
    .await?;

    Ok(question)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &QuizQuestionUpdate) -> Result<QuizQuestion, DatabaseError> {
    let question = sqlx::query_as::<_, QuizQuestion>(
        r#"
        UPDATE quiz_questions SET
            question = COALESCE($2, question),
            options = COALESCE($3, options),
            correct_option = COALESCE($4, correct_option),
            points = COALESCE($5, points),
            difficulty = COALESCE($6, difficulty),
            image_url = COALESCE($7, image_url),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.question.as_ref().map(Json))
    .bind(patch.options.as_ref().map(Json))
    .bind(patch.correct_option)
    .bind(patch.points)
    .bind(patch.difficulty)
    .bind(&patch.image_url)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("Quiz question {} not found", id)))?;

    Ok(question)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM quiz_questions WHERE id = $1").bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("Quiz question {} not found", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_options() -> LocalizedList {
        LocalizedList {
            en: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ar: vec![],
            ckb: vec![],
        }
    }

    #[test]
    fn correct_option_must_be_in_range() {
        assert!(validate_correct_option(&four_options(), 0).is_ok());
        assert!(validate_correct_option(&four_options(), 3).is_ok());
        assert!(validate_correct_option(&four_options(), 4).is_err());
        assert!(validate_correct_option(&four_options(), -1).is_err());
        assert!(validate_correct_option(&LocalizedList::default(), 0).is_err());
    }
}
