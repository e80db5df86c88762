use axum::extract::Path;
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::course::{self, Course, CourseUpdate, NewCourse};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequireTrainer};

/// GET /api/trainer/courses - only the caller's courses, newest first.
pub async fn list(RequireTrainer(identity): RequireTrainer) -> ApiResult<Vec<Course>> {
    let pool = DatabaseManager::app_pool().await?;
    let courses = course::list_for_trainer(&pool, identity.user_id).await?;
    Ok(ApiResponse::success(courses))
}

/// POST /api/trainer/courses - the new course is owned by the caller;
/// ownership is taken from the session, never from the payload.
pub async fn create(
    RequireTrainer(identity): RequireTrainer,
    Json(payload): Json<NewCourse>,
) -> ApiResult<Course> {
    if payload.title.is_empty() {
        return Err(ApiError::validation_error("A course title is required in at least one language", None));
    }

    let pool = DatabaseManager::app_pool().await?;
    let created = course::insert(&pool, identity.user_id, &payload).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/trainer/courses/:id
pub async fn update(
    RequireTrainer(identity): RequireTrainer,
    Path(id): Path<Uuid>,
    Json(patch): Json<CourseUpdate>,
) -> ApiResult<Course> {
    let pool = DatabaseManager::app_pool().await?;
    let updated = course::update_owned(&pool, identity.user_id, id, &patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/trainer/courses/:id
pub async fn remove(RequireTrainer(identity): RequireTrainer, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    course::delete_owned(&pool, identity.user_id, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
