use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

pub mod context;
pub mod gate;
pub mod identity;
pub mod password;
pub mod role;

pub use identity::{Identity, Session};
pub use role::Role;

/// Session token claims. The `role` claim is free-form on the wire so that a
/// token minted before a role was retired still decodes; it is narrowed to
/// the closed [`Role`] enum at identity-resolution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: Option<Role>) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            role: role.map(|r| r.as_str().to_string()),
            exp,
            iat: now.timestamp(),
        }
    }

    /// Seconds until expiry, clamped at zero.
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token is outside the refresh window")]
    RefreshWindowExpired,

    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),
}

fn secret() -> Result<&'static str, AuthError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_token(claims: &Claims) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Validate a token's signature and expiry and return its claims.
pub fn validate_token(token: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(format!("Invalid session token: {}", e)))?;

    Ok(token_data.claims)
}

/// Exchange a token (possibly expired) for a fresh one. The signature must
/// verify and the original expiry must fall within the configured refresh
/// window; claims other than the timestamps are carried over unchanged.
pub fn refresh_token(token: &str) -> Result<(String, Claims), AuthError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = false;

    let old = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(format!("Invalid session token: {}", e)))?
        .claims;

    let window = Duration::hours(config::config().security.refresh_window_hours as i64);
    let oldest_refreshable = (Utc::now() - window).timestamp();
    if old.exp < oldest_refreshable {
        return Err(AuthError::RefreshWindowExpired);
    }

    let role = old.role.as_deref().and_then(|r| r.parse::<Role>().ok());
    let claims = Claims::new(old.sub, old.email, role);
    let token = generate_token(&claims)?;
    Ok((token, claims))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_claims() -> Claims {
        Claims::new(Uuid::new_v4(), "admin@suq.example.com".to_string(), Some(Role::Admin))
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let claims = test_claims();
        let token = generate_token(&claims).unwrap();
        let decoded = validate_token(&token).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, claims.email);
        assert_eq!(decoded.role.as_deref(), Some("admin"));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = generate_token(&test_claims()).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(validate_token(&tampered), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn refresh_reissues_with_same_subject() {
        let claims = test_claims();
        let token = generate_token(&claims).unwrap();
        let (fresh, fresh_claims) = refresh_token(&token).unwrap();
        assert_ne!(fresh, "");
        assert_eq!(fresh_claims.sub, claims.sub);
        assert_eq!(fresh_claims.role, claims.role);
        assert!(fresh_claims.exp >= claims.exp);
    }

    #[test]
    fn claims_report_remaining_lifetime() {
        let claims = test_claims();
        assert!(claims.expires_in() > 0);
    }
}
