use axum::extract::{Path, Query};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::quiz::{
    self, Difficulty, NewQuizQuestion, QuizQuestion, QuizQuestionUpdate,
};
use crate::database::Repository;
use crate::error::ApiError;
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin};

#[derive(Debug, Deserialize)]
pub struct QuizListQuery {
    pub difficulty: Option<Difficulty>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// GET /api/admin/quiz
pub async fn list(RequireAdmin(_): RequireAdmin, Query(query): Query<QuizListQuery>) -> ApiResult<Vec<QuizQuestion>> {
    let pool = DatabaseManager::app_pool().await?;
    let list_query = ListQuery { order: query.order, limit: query.limit, offset: query.offset };
    let filter = list_query.to_filter(
        "created_at desc",
        &[("difficulty", query.difficulty.map(|d| json!(d)))],
    );

    let repository = Repository::<QuizQuestion>::new("quiz_questions", pool);
    let questions = repository.select_any(filter).await?;
    Ok(ApiResponse::success(questions))
}

/// POST /api/admin/quiz
pub async fn create(RequireAdmin(_): RequireAdmin, Json(payload): Json<NewQuizQuestion>) -> ApiResult<QuizQuestion> {
    quiz::validate_correct_option(&payload.options, payload.correct_option)
        .map_err(|msg| ApiError::validation_error(msg, None))?;
    if payload.question.is_empty() {
        return Err(ApiError::validation_error("Question text is required in at least one language", None));
    }

    let pool = DatabaseManager::app_pool().await?;
    let created = quiz::insert(&pool, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/quiz/:id
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<QuizQuestionUpdate>,
) -> ApiResult<QuizQuestion> {
    // When the option lists change, the answer index must be validated
    // against the new lists (falling back to the index being updated too).
    if let Some(options) = &patch.options {
        let correct = patch.correct_option.unwrap_or(0);
        quiz::validate_correct_option(options, correct)
            .map_err(|msg| ApiError::validation_error(msg, None))?;
    } else if let Some(correct) = patch.correct_option {
        if correct < 0 {
            return Err(ApiError::validation_error("correct_option cannot be negative", None));
        }
    }

    let pool = DatabaseManager::app_pool().await?;
    let updated = quiz::update(&pool, id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/quiz/:id
pub async fn remove(RequireAdmin(_): RequireAdmin, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    quiz::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
