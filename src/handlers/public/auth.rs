use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{refresh_token, Role};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - authenticate with email and password, receive a
/// session token plus the account summary.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let pool = DatabaseManager::app_pool().await?;
    let outcome = account_service::login(&pool, payload.email.trim(), &payload.password).await?;

    Ok(ApiResponse::success(json!({
        "token": outcome.token,
        "user": outcome.account,
        "expires_in": outcome.claims.expires_in(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// POST /auth/signup - self-service account creation. Only open in
/// environments that allow it, and never for the admin role; staff and
/// broker accounts are provisioned through the admin endpoints instead.
pub async fn signup(Json(payload): Json<SignupRequest>) -> ApiResult<Value> {
    if !config::config().auth.allow_public_signup {
        return Err(ApiError::forbidden("Signup is disabled, contact an administrator"));
    }
    if payload.role == Role::Admin {
        return Err(ApiError::forbidden("Admin accounts cannot be self-registered"));
    }

    let pool = DatabaseManager::app_pool().await?;
    let account = account_service::provision_account(
        &pool,
        payload.email.trim(),
        payload.username.trim(),
        &payload.password,
        payload.role,
    )
    .await?;

    Ok(ApiResponse::created(json!({ "user": account })))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// POST /auth/refresh - exchange a (possibly expired) token for a fresh one
/// without re-entering credentials.
pub async fn refresh(Json(payload): Json<RefreshRequest>) -> ApiResult<Value> {
    let (token, claims) = refresh_token(&payload.token)?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_in": claims.expires_in(),
    })))
}
