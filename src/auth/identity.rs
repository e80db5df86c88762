use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// The application's resolved view of the current principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    /// None means authenticated but un-roled; every gate treats that as
    /// "no access".
    pub role: Option<Role>,
}

/// An authenticated session as issued by the auth provider: the bearer token
/// plus the user record embedded alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: Uuid,
    pub email: String,
    /// Role tag carried in the session metadata, unparsed. Only consulted
    /// when the deployment resolves roles from session metadata.
    pub role_claim: Option<String>,
}

/// Session transition reported by the auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Which source the resolver consults for a session's role. The strategies
/// are mutually exclusive: a deployment configures exactly one, and the other
/// is never used as a fallback (they can disagree after a role change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSource {
    /// Read the role tag embedded in the session metadata.
    SessionMetadata,
    /// Look the role up in the user_profiles record keyed by user id.
    ProfileTable,
}

/// A remote call to an external collaborator failed.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// The external auth provider, as consumed by the identity resolver.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session, if any. `None` is a normal signed-out state.
    async fn get_session(&self) -> Result<Option<Session>, ProviderError>;
}

/// Profile-table role lookup, keyed by user id.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    /// `Ok(None)` when no profile row exists for the user.
    async fn lookup_role(&self, user_id: Uuid) -> Result<Option<Role>, ProviderError>;
}

/// Resolve a session's role according to the configured source.
///
/// Failures are absorbed: a missing profile row, a failed lookup or an
/// unknown role tag all resolve to `None`, leaving the user authenticated but
/// un-roled rather than surfacing a hard error.
pub async fn resolve_role(
    source: RoleSource,
    session: &Session,
    lookup: &dyn RoleLookup,
) -> Option<Role> {
    match source {
        RoleSource::SessionMetadata => {
            session.role_claim.as_deref().and_then(|tag| match tag.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    tracing::warn!("Session for {} carries unknown role tag '{}'", session.user_id, tag);
                    None
                }
            })
        }
        RoleSource::ProfileTable => match lookup.lookup_role(session.user_id).await {
            Ok(role) => role,
            Err(e) => {
                tracing::warn!("Role lookup for {} failed: {}", session.user_id, e);
                None
            }
        },
    }
}

/// Derive the full identity for a session under the configured role source.
pub async fn resolve_identity(
    source: RoleSource,
    session: &Session,
    lookup: &dyn RoleLookup,
) -> Identity {
    Identity {
        user_id: session.user_id,
        email: session.email.clone(),
        role: resolve_role(source, session, lookup).await,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scriptable profile store: per-user roles, optional per-call delay and
    /// failure injection.
    pub struct FakeRoleLookup {
        roles: Mutex<HashMap<Uuid, Role>>,
        pub delay: Mutex<Option<Duration>>,
        pub fail: Mutex<bool>,
    }

    impl FakeRoleLookup {
        pub fn new() -> Self {
            Self { roles: Mutex::new(HashMap::new()), delay: Mutex::new(None), fail: Mutex::new(false) }
        }

        pub fn with_role(self, user_id: Uuid, role: Role) -> Self {
            self.roles.lock().unwrap().insert(user_id, role);
            self
        }

        pub fn set_delay(&self, delay: Option<Duration>) {
            *self.delay.lock().unwrap() = delay;
        }
    }

    #[async_trait]
    impl RoleLookup for FakeRoleLookup {
        async fn lookup_role(&self, user_id: Uuid) -> Result<Option<Role>, ProviderError> {
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if *self.fail.lock().unwrap() {
                return Err(ProviderError("profile store unreachable".to_string()));
            }
            Ok(self.roles.lock().unwrap().get(&user_id).copied())
        }
    }

    pub fn session_for(user_id: Uuid, role_claim: Option<&str>) -> Session {
        Session {
            access_token: "test-token".to_string(),
            user_id,
            email: format!("{user_id}@suq.example.com"),
            role_claim: role_claim.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn metadata_source_parses_known_role() {
        let user = Uuid::new_v4();
        let lookup = FakeRoleLookup::new();
        let session = session_for(user, Some("admin"));
        let role = resolve_role(RoleSource::SessionMetadata, &session, &lookup).await;
        assert_eq!(role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn metadata_source_treats_unknown_tag_as_unroled() {
        let user = Uuid::new_v4();
        let lookup = FakeRoleLookup::new().with_role(user, Role::Admin);
        let session = session_for(user, Some("owner"));
        // Unknown tag resolves to None; the profile table must NOT be used
        // as a fallback even though it knows this user.
        let role = resolve_role(RoleSource::SessionMetadata, &session, &lookup).await;
        assert_eq!(role, None);
    }

    #[tokio::test]
    async fn profile_source_reads_profile_row() {
        let user = Uuid::new_v4();
        let lookup = FakeRoleLookup::new().with_role(user, Role::Trainer);
        // Claim says broker, but the configured source is the profile table.
        let session = session_for(user, Some("broker"));
        let role = resolve_role(RoleSource::ProfileTable, &session, &lookup).await;
        assert_eq!(role, Some(Role::Trainer));
    }

    #[tokio::test]
    async fn profile_source_missing_row_resolves_to_none() {
        let user = Uuid::new_v4();
        let lookup = FakeRoleLookup::new();
        let session = session_for(user, Some("admin"));
        let role = resolve_role(RoleSource::ProfileTable, &session, &lookup).await;
        assert_eq!(role, None);
    }

    #[tokio::test]
    async fn profile_source_lookup_failure_resolves_to_none() {
        let user = Uuid::new_v4();
        let lookup = FakeRoleLookup::new().with_role(user, Role::Broker);
        *lookup.fail.lock().unwrap() = true;
        let session = session_for(user, None);
        let role = resolve_role(RoleSource::ProfileTable, &session, &lookup).await;
        assert_eq!(role, None);
    }
}
