use axum::extract::{Multipart, Path};
use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::middleware::gate::RequireSession;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::storage::StorageClient;

/// POST /api/media/:bucket - multipart upload into object storage. Objects
/// are keyed under the uploader's user id, so one principal can never
/// overwrite another's files. Returns the public URL to store on the entity.
pub async fn upload(
    RequireSession(identity): RequireSession,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Value> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        .ok_or_else(|| ApiError::bad_request("You must select a file to upload"))?;

    let original_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

    let max = config::config().api.max_upload_size_bytes;
    if bytes.len() > max {
        return Err(ApiError::bad_request(format!(
            "File is too large ({} bytes, limit {})",
            bytes.len(),
            max
        )));
    }
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let storage = StorageClient::from_config()?;
    let key = StorageClient::object_key(&identity.user_id.to_string(), &original_name);
    let url = storage.upload(&bucket, &key, bytes.to_vec(), &content_type).await?;

    tracing::info!("{} uploaded {} bytes to {}/{}", identity.email, bytes.len(), bucket, key);
    Ok(ApiResponse::created(json!({
        "bucket": bucket,
        "path": key,
        "url": url,
        "size_bytes": bytes.len(),
    })))
}
