use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::identity::RoleSource;
use crate::auth::{generate_token, password, Claims, Identity, Role};
use crate::config;
use crate::database::models::account::{
    self, AccountStatus, UserAccount, UserProfile,
};
use crate::error::ApiError;

/// Public view of an account, safe to return from auth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<&UserAccount> for AccountView {
    fn from(account: &UserAccount) -> Self {
        Self { id: account.id, email: account.email.clone(), role: account.role }
    }
}

pub struct LoginOutcome {
    pub token: String,
    pub claims: Claims,
    pub account: AccountView,
}

/// Password login. Verification runs against a decoy hash when the account
/// does not exist so response timing does not reveal which emails are
/// registered.
pub async fn login(pool: &PgPool, email: &str, password_input: &str) -> Result<LoginOutcome, ApiError> {
    let account = match account::find_account_by_email(pool, email).await? {
        Some(account) => account,
        None => {
            password::dummy_verify(password_input);
            return Err(crate::auth::AuthError::InvalidCredentials.into());
        }
    };

    password::verify_password(password_input, &account.password_hash)?;

    if account.status == AccountStatus::Inactive {
        return Err(crate::auth::AuthError::AccountInactive.into());
    }

    let claims = Claims::new(account.id, account.email.clone(), Some(account.role));
    let token = generate_token(&claims)?;

    tracing::info!("Login: {} ({})", account.email, account.role);
    Ok(LoginOutcome { token, claims, account: AccountView::from(&account) })
}

/// Create a login account plus its profile row. Email uniqueness is checked
/// up front so the caller gets a conflict instead of a bare SQL error.
pub async fn provision_account(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_input: &str,
    role: Role,
) -> Result<AccountView, ApiError> {
    validate_credentials(email, password_input)?;

    if account::find_account_by_email(pool, email).await?.is_some() {
        return Err(ApiError::conflict(format!("An account already exists for {}", email)));
    }

    let hash = password::hash_password(password_input)?;
    let created = account::create_account_with_profile(pool, email, username, &hash, role).await?;

    tracing::info!("Provisioned {} account for {}", role, created.email);
    Ok(AccountView::from(&created))
}

fn validate_credentials(email: &str, password_input: &str) -> Result<(), ApiError> {
    let mut field_errors = std::collections::HashMap::new();
    if !email.contains('@') || email.len() < 3 {
        field_errors.insert("email".to_string(), "A valid email address is required".to_string());
    }
    if password_input.len() < 8 {
        field_errors.insert("password".to_string(), "Password must be at least 8 characters".to_string());
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid signup fields", Some(field_errors)))
    }
}

/// Resolve the caller's effective identity under the configured role source.
/// The database is only consulted for the profile-table source; a missing or
/// unknown profile role yields an un-roled identity, never an error.
pub async fn effective_identity(claims_identity: Identity) -> Result<Identity, ApiError> {
    match config::config().auth.role_source {
        RoleSource::SessionMetadata => Ok(claims_identity),
        RoleSource::ProfileTable => {
            let pool = crate::database::manager::DatabaseManager::app_pool().await?;
            let role = match account::profile_role_tag(&pool, claims_identity.user_id).await {
                Ok(tag) => tag.and_then(|t| t.parse::<Role>().ok()),
                Err(e) => {
                    tracing::warn!("Profile role lookup failed for {}: {}", claims_identity.user_id, e);
                    None
                }
            };
            Ok(Identity { role, ..claims_identity })
        }
    }
}

pub async fn list_staff(pool: &PgPool, role: Option<Role>) -> Result<Vec<UserProfile>, ApiError> {
    Ok(account::list_profiles(pool, role).await?)
}

pub async fn set_staff_status(
    pool: &PgPool,
    user_id: Uuid,
    status: AccountStatus,
) -> Result<UserProfile, ApiError> {
    Ok(account::set_account_status(pool, user_id, status).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_validation_names_offending_fields() {
        let err = validate_credentials("not-an-email", "short").unwrap_err();
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"]["email"].is_string());
        assert!(body["field_errors"]["password"].is_string());

        assert!(validate_credentials("admin@suq.example.com", "long-enough-pw").is_ok());
    }
}
