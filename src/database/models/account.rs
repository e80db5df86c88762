use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

/// Login credential row, owned by the auth layer. Never serialized to
/// clients with the hash attached; see [`StaffMember`] for the admin view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile record keyed by account id: the profile-table role source and
/// the admin staff surface.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

/// Staff row as served to the admin list (no credentials).
pub type StaffMember = UserProfile;

pub async fn find_account_by_email(pool: &PgPool, email: &str) -> Result<Option<UserAccount>, DatabaseError> {
    let account = sqlx::query_as::<_, UserAccount>(
        r#"
        SELECT id, email, password_hash, role, status, created_at, updated_at
        FROM user_accounts
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

pub async fn find_account_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserAccount>, DatabaseError> {
    let account = sqlx::query_as::<_, UserAccount>(
        r#"
        SELECT id, email, password_hash, role, status, created_at, updated_at
        FROM user_accounts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Create the credential row and its profile in one transaction so the
/// profile-table role source can never observe an account without a role row.
pub async fn create_account_with_profile(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<UserAccount, DatabaseError> {
    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4();

    let account = sqlx::query_as::<_, UserAccount>(
        r#"
        INSERT INTO user_accounts (id, email, password_hash, role, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 'active', now(), now())
        RETURNING id, email, password_hash, role, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_profiles (id, email, username, role, status, created_at)
        VALUES ($1, $2, $3, $4, 'active', now())
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(username)
    .bind(role)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(account)
}

/// Raw role tag from the profile table. Returned untyped so an unknown tag
/// degrades to "no role" at resolution time instead of failing the row.
pub async fn profile_role_tag(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
    let tag = sqlx::query_scalar::<_, String>(
        r#"
        SELECT role FROM user_profiles WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(tag)
}

pub async fn list_profiles(pool: &PgPool, role: Option<Role>) -> Result<Vec<UserProfile>, DatabaseError> {
    let profiles = match role {
        Some(role) => {
            sqlx::query_as::<_, UserProfile>(
                r#"
                SELECT id, email, username, role, status, created_at
                FROM user_profiles
                WHERE role = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(role)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, UserProfile>(
                r#"
                SELECT id, email, username, role, status, created_at
                FROM user_profiles
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(profiles)
}

/// Flip an account between active and inactive; mirrored on the profile so
/// the staff list reflects it without a join.
pub async fn set_account_status(
    pool: &PgPool,
    user_id: Uuid,
    status: AccountStatus,
) -> Result<UserProfile, DatabaseError> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query("UPDATE user_accounts SET status = $2, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("No account for user {}", user_id)));
    }

    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        UPDATE user_profiles SET status = $2 WHERE id = $1
        RETURNING id, email, username, role, status, created_at
        "#,
    )
    .bind(user_id)
    .bind(status)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_status_serde_tags() {
        assert_eq!(serde_json::to_string(&AccountStatus::Active).unwrap(), "\"active\"");
        let parsed: AccountStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(parsed, AccountStatus::Inactive);
    }
}
