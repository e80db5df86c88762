use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use super::identity::{resolve_identity, AuthEvent, Identity, RoleSource, RoleLookup, Session, SessionProvider};

/// The resolver's published view: who is using the application right now and
/// in what capacity. `loading` is true only until the first resolution
/// completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self { identity: None, loading: true }
    }
}

/// Identity resolver: derives `(Identity | null, loading)` from the auth
/// provider's session and keeps it current across session transitions.
///
/// Single writer, many readers: the context owns the watch sender; gates and
/// commands hold receivers from [`AuthContext::subscribe`]. Each transition
/// bumps an epoch before any await, and a resolution only publishes while its
/// epoch is still current, so a slow role lookup for a superseded session can
/// never overwrite a newer resolution.
pub struct AuthContext {
    tx: watch::Sender<AuthSnapshot>,
    epoch: AtomicU64,
    role_source: RoleSource,
    lookup: Arc<dyn RoleLookup>,
}

impl AuthContext {
    pub fn new(role_source: RoleSource, lookup: Arc<dyn RoleLookup>) -> Self {
        let (tx, _) = watch::channel(AuthSnapshot::default());
        Self { tx, epoch: AtomicU64::new(0), role_source, lookup }
    }

    /// Reader handle; every published snapshot is observable through it.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    /// Current snapshot without subscribing.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    /// Startup resolution: fetch the current session and derive identity from
    /// it. Publishes `loading = false` once resolution completes regardless
    /// of outcome; a provider failure is treated as signed-out.
    pub async fn initialize(&self, provider: &dyn SessionProvider) {
        let session = match provider.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Session fetch failed, treating as signed out: {}", e);
                None
            }
        };
        self.apply(session).await;
    }

    /// Session transition handler. Re-derives identity with the same rule as
    /// `initialize`; an absent session clears identity synchronously, before
    /// this call returns.
    pub async fn on_session_change(&self, event: AuthEvent, session: Option<Session>) {
        tracing::debug!("Auth state change: {:?}", event);
        self.apply(session).await;
    }

    async fn apply(&self, session: Option<Session>) {
        // The bump is the synchronous part of every transition: it happens
        // before any await, so in-flight resolutions for older sessions are
        // already superseded by the time they try to publish.
        let token = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        match session {
            None => self.publish(token, None),
            Some(session) => {
                let identity = resolve_identity(self.role_source, &session, &*self.lookup).await;
                self.publish(token, Some(identity));
            }
        }
    }

    fn publish(&self, token: u64, identity: Option<Identity>) {
        self.tx.send_if_modified(|snapshot| {
            if self.epoch.load(Ordering::SeqCst) != token {
                tracing::debug!("Discarding superseded identity resolution");
                return false;
            }
            *snapshot = AuthSnapshot { identity, loading: false };
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::test_support::{session_for, FakeRoleLookup};
    use crate::auth::identity::ProviderError;
    use crate::auth::Role;
    use async_trait::async_trait;
    use std::time::Duration;
    use uuid::Uuid;

    struct FixedProvider(Option<Session>);

    #[async_trait]
    impl SessionProvider for FixedProvider {
        async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SessionProvider for FailingProvider {
        async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
            Err(ProviderError("auth provider unreachable".to_string()))
        }
    }

    fn metadata_context() -> AuthContext {
        AuthContext::new(RoleSource::SessionMetadata, Arc::new(FakeRoleLookup::new()))
    }

    #[tokio::test]
    async fn starts_loading_with_no_identity() {
        let ctx = metadata_context();
        let snapshot = ctx.snapshot();
        assert!(snapshot.loading);
        assert!(snapshot.identity.is_none());
    }

    #[tokio::test]
    async fn initialize_without_session_finishes_loading() {
        let ctx = metadata_context();
        ctx.initialize(&FixedProvider(None)).await;
        let snapshot = ctx.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.identity.is_none());
    }

    #[tokio::test]
    async fn initialize_resolves_metadata_role() {
        let user = Uuid::new_v4();
        let ctx = metadata_context();
        ctx.initialize(&FixedProvider(Some(session_for(user, Some("admin"))))).await;

        let snapshot = ctx.snapshot();
        assert!(!snapshot.loading);
        let identity = snapshot.identity.expect("identity");
        assert_eq!(identity.user_id, user);
        assert_eq!(identity.role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn provider_failure_is_treated_as_signed_out() {
        let ctx = metadata_context();
        ctx.initialize(&FailingProvider).await;
        let snapshot = ctx.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.identity.is_none());
    }

    #[tokio::test]
    async fn missing_profile_row_yields_unroled_identity() {
        let user = Uuid::new_v4();
        let ctx = AuthContext::new(RoleSource::ProfileTable, Arc::new(FakeRoleLookup::new()));
        ctx.on_session_change(AuthEvent::SignedIn, Some(session_for(user, Some("admin")))).await;

        let identity = ctx.snapshot().identity.expect("identity");
        assert_eq!(identity.role, None);
    }

    #[tokio::test]
    async fn sign_out_clears_identity_synchronously() {
        let user = Uuid::new_v4();
        let ctx = metadata_context();
        ctx.on_session_change(AuthEvent::SignedIn, Some(session_for(user, Some("broker")))).await;
        assert!(ctx.snapshot().identity.is_some());

        ctx.on_session_change(AuthEvent::SignedOut, None).await;
        assert!(ctx.snapshot().identity.is_none());
        assert!(!ctx.snapshot().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn later_session_wins_even_when_earlier_resolution_finishes_last() {
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let lookup = Arc::new(
            FakeRoleLookup::new().with_role(user_a, Role::Admin).with_role(user_b, Role::Trainer),
        );
        let ctx = Arc::new(AuthContext::new(RoleSource::ProfileTable, lookup.clone()));

        // Session A's profile lookup stalls for a long time.
        lookup.set_delay(Some(Duration::from_millis(500)));
        let slow = tokio::spawn({
            let ctx = ctx.clone();
            let session = session_for(user_a, None);
            async move { ctx.on_session_change(AuthEvent::SignedIn, Some(session)).await }
        });
        tokio::task::yield_now().await;

        // Session B arrives while A is still in flight and resolves quickly.
        lookup.set_delay(None);
        ctx.on_session_change(AuthEvent::SignedIn, Some(session_for(user_b, None))).await;
        assert_eq!(ctx.snapshot().identity.as_ref().and_then(|i| i.role), Some(Role::Trainer));

        // A's resolution completes afterwards and must be discarded.
        tokio::time::advance(Duration::from_millis(600)).await;
        slow.await.unwrap();

        let identity = ctx.snapshot().identity.expect("identity");
        assert_eq!(identity.user_id, user_b);
        assert_eq!(identity.role, Some(Role::Trainer));
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_is_not_overwritten_by_stale_resolution() {
        let user = Uuid::new_v4();
        let lookup = Arc::new(FakeRoleLookup::new().with_role(user, Role::Admin));
        let ctx = Arc::new(AuthContext::new(RoleSource::ProfileTable, lookup.clone()));

        lookup.set_delay(Some(Duration::from_millis(200)));
        let slow = tokio::spawn({
            let ctx = ctx.clone();
            let session = session_for(user, None);
            async move { ctx.on_session_change(AuthEvent::SignedIn, Some(session)).await }
        });
        tokio::task::yield_now().await;

        ctx.on_session_change(AuthEvent::SignedOut, None).await;
        tokio::time::advance(Duration::from_millis(300)).await;
        slow.await.unwrap();

        assert!(ctx.snapshot().identity.is_none(), "stale sign-in overwrote a sign-out");
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let user = Uuid::new_v4();
        let ctx = metadata_context();
        let mut rx = ctx.subscribe();
        assert!(rx.borrow().loading);

        ctx.on_session_change(AuthEvent::SignedIn, Some(session_for(user, Some("trainer")))).await;
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.identity.as_ref().and_then(|i| i.role), Some(Role::Trainer));
    }
}
