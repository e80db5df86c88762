use thiserror::Error;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unknown storage bucket: {0}")]
    UnknownBucket(String),

    #[error("{0}")]
    InvalidObjectPath(String),

    #[error("Storage gateway returned status {0}")]
    UnexpectedStatus(u16),

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("Invalid storage base URL")]
    InvalidBaseUrl,
}

/// Client for the object storage gateway: PUT uploads with the service
/// token, public GET URLs for everything stored. Objects are keyed by uuid
/// under a caller-supplied prefix so uploads never collide.
pub struct StorageClient {
    base_url: url::Url,
    service_token: String,
    buckets: Vec<String>,
    http: reqwest::Client,
}

impl StorageClient {
    pub fn from_config() -> Result<Self, StorageError> {
        let storage = &config::config().storage;
        let base_url = url::Url::parse(&storage.base_url).map_err(|_| StorageError::InvalidBaseUrl)?;
        Ok(Self {
            base_url,
            service_token: storage.service_token.clone(),
            buckets: storage.buckets.clone(),
            http: reqwest::Client::new(),
        })
    }

    /// Generate a collision-free object key, keeping the original extension
    /// so public URLs stay recognizable.
    pub fn object_key(prefix: &str, original_name: &str) -> String {
        let ext = original_name.rsplit('.').next().filter(|e| {
            !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric())
        });
        match ext {
            Some(ext) if original_name.contains('.') => format!("{}/{}.{}", prefix, Uuid::new_v4(), ext),
            _ => format!("{}/{}", prefix, Uuid::new_v4()),
        }
    }

    fn validate(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        if !self.buckets.iter().any(|b| b == bucket) {
            return Err(StorageError::UnknownBucket(bucket.to_string()));
        }
        if path.is_empty() || path.starts_with('/') || path.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return Err(StorageError::InvalidObjectPath(format!("Invalid object path: {}", path)));
        }
        Ok(())
    }

    fn object_url(&self, bucket: &str, path: &str) -> Result<url::Url, StorageError> {
        self.base_url
            .join(&format!("{}/{}", bucket, path))
            .map_err(|_| StorageError::InvalidObjectPath(format!("Invalid object path: {}", path)))
    }

    /// Upload bytes and return the object's public URL.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.validate(bucket, path)?;
        let url = self.object_url(bucket, path)?;

        let response = self
            .http
            .put(url.clone())
            .bearer_auth(&self.service_token)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::UnexpectedStatus(response.status().as_u16()));
        }

        tracing::debug!("Uploaded object {}/{}", bucket, path);
        Ok(url.to_string())
    }

    /// Public URL for a stored object; the gateway serves configured buckets
    /// without authentication.
    pub fn public_url(&self, bucket: &str, path: &str) -> Result<String, StorageError> {
        self.validate(bucket, path)?;
        Ok(self.object_url(bucket, path)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StorageClient {
        StorageClient {
            base_url: url::Url::parse("http://storage.local:9000/").unwrap(),
            service_token: "svc".to_string(),
            buckets: vec!["brokers".to_string(), "course-content".to_string()],
            http: reqwest::Client::new(),
        }
    }

    #[test]
    fn object_keys_keep_safe_extensions() {
        let key = StorageClient::object_key("quiz-images", "chart.png");
        assert!(key.starts_with("quiz-images/"));
        assert!(key.ends_with(".png"));

        let no_ext = StorageClient::object_key("quiz-images", "README");
        assert!(!no_ext.contains('.'));

        // An extension with path characters is dropped, not trusted.
        let weird = StorageClient::object_key("quiz-images", "evil.p/ng");
        assert!(!weird.ends_with("p/ng"));
    }

    #[test]
    fn unknown_bucket_is_rejected() {
        let c = client();
        assert!(matches!(c.public_url("secrets", "a.png"), Err(StorageError::UnknownBucket(_))));
    }

    #[test]
    fn traversal_paths_are_rejected() {
        let c = client();
        for bad in ["../etc/passwd", "a//b", "/rooted", ""] {
            assert!(
                matches!(c.public_url("brokers", bad), Err(StorageError::InvalidObjectPath(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn public_url_joins_bucket_and_key() {
        let c = client();
        let url = c.public_url("brokers", "logos/abc.png").unwrap();
        assert_eq!(url, "http://storage.local:9000/brokers/logos/abc.png");
    }
}
