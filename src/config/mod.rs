use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::auth::identity::RoleSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_list_limit: Option<i32>,
    pub enable_request_logging: bool,
    pub max_upload_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// How long past expiry a token may still be exchanged for a fresh one.
    pub refresh_window_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Where the resolver reads a session's role from. The two strategies are
    /// mutually exclusive; a deployment picks one and sticks with it.
    pub role_source: RoleSource,
    /// Login entry point browsers are redirected to on gate denial.
    pub login_route: String,
    /// Self-service signup; disabled outside development, where accounts are
    /// provisioned through the admin staff endpoints instead.
    pub allow_public_signup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of the object storage gateway (S3-style PUT + public GET).
    pub base_url: String,
    pub service_token: String,
    pub buckets: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_LIST_LIMIT") {
            self.api.max_list_limit = v.parse().ok();
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_SIZE_BYTES") {
            self.api.max_upload_size_bytes = v.parse().unwrap_or(self.api.max_upload_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_REFRESH_WINDOW_HOURS") {
            self.security.refresh_window_hours = v.parse().unwrap_or(self.security.refresh_window_hours);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_ROLE_SOURCE") {
            self.auth.role_source = match v.as_str() {
                "profile" | "profile_table" => RoleSource::ProfileTable,
                _ => RoleSource::SessionMetadata,
            };
        }
        if let Ok(v) = env::var("AUTH_LOGIN_ROUTE") {
            self.auth.login_route = v;
        }
        if let Ok(v) = env::var("AUTH_ALLOW_PUBLIC_SIGNUP") {
            self.auth.allow_public_signup = v.parse().unwrap_or(self.auth.allow_public_signup);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_BASE_URL") {
            self.storage.base_url = v;
        }
        if let Ok(v) = env::var("STORAGE_SERVICE_TOKEN") {
            self.storage.service_token = v;
        }
        if let Ok(v) = env::var("STORAGE_BUCKETS") {
            self.storage.buckets = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn base_storage() -> StorageConfig {
        StorageConfig {
            base_url: "http://localhost:9000".to_string(),
            service_token: String::new(),
            buckets: vec![
                "brokers".to_string(),
                "trainers".to_string(),
                "course-content".to_string(),
                "carousel".to_string(),
                "articles".to_string(),
                "broker-media".to_string(),
            ],
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                max_list_limit: Some(1000),
                enable_request_logging: true,
                max_upload_size_bytes: 50 * 1024 * 1024, // 50MB, broker videos
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "suq-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                refresh_window_hours: 24 * 7,
            },
            auth: AuthConfig {
                role_source: RoleSource::SessionMetadata,
                login_route: "/login".to_string(),
                allow_public_signup: true,
            },
            storage: Self::base_storage(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            api: ApiConfig {
                max_list_limit: Some(500),
                enable_request_logging: true,
                max_upload_size_bytes: 50 * 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.suq.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                refresh_window_hours: 24 * 3,
            },
            auth: AuthConfig {
                role_source: RoleSource::SessionMetadata,
                login_route: "/login".to_string(),
                allow_public_signup: false,
            },
            storage: Self::base_storage(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            api: ApiConfig {
                max_list_limit: Some(100),
                enable_request_logging: false,
                max_upload_size_bytes: 20 * 1024 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.suq.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                refresh_window_hours: 24,
            },
            auth: AuthConfig {
                role_source: RoleSource::SessionMetadata,
                login_route: "/login".to_string(),
                allow_public_signup: false,
            },
            storage: Self::base_storage(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.api.max_list_limit, Some(1000));
        assert!(config.auth.allow_public_signup);
        assert!(matches!(config.auth.role_source, RoleSource::SessionMetadata));
    }

    #[test]
    fn production_locks_down_signup() {
        let config = AppConfig::production();
        assert_eq!(config.api.max_list_limit, Some(100));
        assert!(!config.auth.allow_public_signup);
        assert!(config.security.jwt_secret.is_empty(), "production secret must come from the environment");
    }

    #[test]
    fn storage_buckets_cover_media_surfaces() {
        let config = AppConfig::development();
        for bucket in ["brokers", "course-content", "broker-media"] {
            assert!(config.storage.buckets.iter().any(|b| b == bucket), "missing bucket {bucket}");
        }
    }
}
