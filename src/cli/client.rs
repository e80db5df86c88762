use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::identity::{ProviderError, RoleLookup, Session, SessionProvider};
use crate::auth::Role;

use super::config::{load_server_config, load_session, SavedSession};

/// HTTP client for the remote Suq API: the auth provider and data store the
/// CLI consumes.
pub struct RemoteClient {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteClient {
    pub fn from_config() -> anyhow::Result<Self> {
        let server = load_server_config()?;
        Ok(Self {
            base_url: server.base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> anyhow::Result<Value> {
        let response = self.http.get(self.url("/health")).send().await?;
        Ok(response.json().await?)
    }

    /// POST /auth/login, returning the session to persist.
    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<SavedSession> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .context("login request failed")?;

        let status = response.status();
        let body: Value = response.json().await.context("login response was not JSON")?;
        if !status.is_success() {
            bail!("login failed: {}", body["message"].as_str().unwrap_or("unknown error"));
        }

        Self::session_from_login_body(&body)
    }

    fn session_from_login_body(body: &Value) -> anyhow::Result<SavedSession> {
        let data = &body["data"];
        let token = data["token"].as_str().context("missing token in login response")?;
        let user = &data["user"];
        let user_id = user["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .context("missing user id in login response")?;
        let email = user["email"].as_str().context("missing email in login response")?;
        let expires_in = data["expires_in"].as_i64().unwrap_or(0);

        Ok(SavedSession {
            token: token.to_string(),
            user_id,
            email: email.to_string(),
            role: user["role"].as_str().map(str::to_string),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }

    /// POST /auth/refresh - trade the saved token for a fresh one.
    pub async fn refresh(&self, session: &SavedSession) -> anyhow::Result<SavedSession> {
        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&serde_json::json!({ "token": session.token }))
            .send()
            .await
            .context("refresh request failed")?;

        let status = response.status();
        let body: Value = response.json().await.context("refresh response was not JSON")?;
        if !status.is_success() {
            bail!("refresh failed: {}", body["message"].as_str().unwrap_or("unknown error"));
        }

        let token = body["data"]["token"].as_str().context("missing token in refresh response")?;
        let expires_in = body["data"]["expires_in"].as_i64().unwrap_or(0);

        Ok(SavedSession {
            token: token.to_string(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
            ..session.clone()
        })
    }

    /// DELETE /api/auth/session - best-effort server-side logout.
    pub async fn logout(&self, token: &str) -> anyhow::Result<()> {
        let _ = self
            .http
            .delete(self.url("/api/auth/session"))
            .bearer_auth(token)
            .send()
            .await
            .context("logout request failed")?;
        Ok(())
    }

    /// GET /api/auth/whoami - the server-resolved identity for a token.
    pub async fn whoami(&self, token: &str) -> anyhow::Result<Value> {
        let response = self.http.get(self.url("/api/auth/whoami")).bearer_auth(token).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            bail!("whoami failed: {}", body["message"].as_str().unwrap_or("unknown error"));
        }
        Ok(body)
    }

    /// Authenticated GET of any API path, returning the envelope's data.
    pub async fn get_data(&self, path: &str, token: &str) -> anyhow::Result<Value> {
        let response = self.http.get(self.url(path)).bearer_auth(token).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            bail!("request failed ({}): {}", status, body["message"].as_str().unwrap_or("unknown error"));
        }
        Ok(body["data"].clone())
    }
}

/// Session provider over the saved session file: the CLI's analog of asking
/// the auth provider for the current session on startup.
pub struct StoredSessionProvider;

#[async_trait]
impl SessionProvider for StoredSessionProvider {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        match load_session() {
            Ok(Some(saved)) if !saved.is_expired() => Ok(Some(saved.to_session())),
            Ok(_) => Ok(None),
            Err(e) => Err(ProviderError(e.to_string())),
        }
    }
}

impl SavedSession {
    pub fn to_session(&self) -> Session {
        Session {
            access_token: self.token.clone(),
            user_id: self.user_id,
            email: self.email.clone(),
            role_claim: self.role.clone(),
        }
    }
}

/// Profile-table role lookup over the wire: asks the server's whoami
/// endpoint, which consults user_profiles when so configured.
pub struct RemoteRoleLookup {
    client: RemoteClient,
}

impl RemoteRoleLookup {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleLookup for RemoteRoleLookup {
    async fn lookup_role(&self, user_id: Uuid) -> Result<Option<Role>, ProviderError> {
        let saved = match load_session() {
            Ok(Some(saved)) if saved.user_id == user_id => saved,
            Ok(_) => return Ok(None),
            Err(e) => return Err(ProviderError(e.to_string())),
        };

        let body = self.client.whoami(&saved.token).await.map_err(|e| ProviderError(e.to_string()))?;
        Ok(body["data"]["role"].as_str().and_then(|tag| tag.parse::<Role>().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_login_response() {
        let id = Uuid::new_v4();
        let body = json!({
            "success": true,
            "data": {
                "token": "jwt-here",
                "user": { "id": id.to_string(), "email": "a@suq.example.com", "role": "admin" },
                "expires_in": 3600
            }
        });
        let session = RemoteClient::session_from_login_body(&body).unwrap();
        assert_eq!(session.user_id, id);
        assert_eq!(session.role.as_deref(), Some("admin"));
        assert!(!session.is_expired());
    }

    #[test]
    fn rejects_malformed_login_response() {
        assert!(RemoteClient::session_from_login_body(&json!({"data": {}})).is_err());
    }
}
