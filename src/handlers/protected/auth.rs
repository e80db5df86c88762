use serde_json::{json, Value};

use crate::middleware::gate::RequireSession;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::account_service;

/// GET /api/auth/whoami - the caller's resolved identity under the
/// configured role source. An authenticated but un-roled caller still gets a
/// 200 here; every gated route will turn them away.
pub async fn whoami(RequireSession(identity): RequireSession) -> ApiResult<Value> {
    let identity = account_service::effective_identity(identity).await?;

    Ok(ApiResponse::success(json!({
        "id": identity.user_id,
        "email": identity.email,
        "role": identity.role,
    })))
}

/// DELETE /api/auth/session - logout acknowledgement. Tokens are stateless;
/// the client discards its copy and reports the transition to its resolver.
pub async fn logout(RequireSession(identity): RequireSession) -> ApiResult<Value> {
    tracing::info!("Logout: {}", identity.email);
    Ok(ApiResponse::success(json!({ "signed_out": true })))
}
