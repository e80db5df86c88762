use tokio::sync::watch;

use super::context::AuthSnapshot;
use super::identity::Identity;
use super::role::Role;

/// Outcome of evaluating an allow-list against the resolver's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Resolution has not completed; render nothing and do not redirect.
    Pending,
    /// No identity, no role, or role not in the allow-list: send the caller
    /// to the login entry point and reveal nothing else.
    Denied,
    Granted(Identity),
}

/// Evaluate one snapshot against an allow-list.
///
/// Re-run on every snapshot change by reactive callers; the decision is a
/// pure function of `(snapshot, allowed)`.
pub fn evaluate(snapshot: &AuthSnapshot, allowed: &[Role]) -> GateDecision {
    if snapshot.loading {
        return GateDecision::Pending;
    }

    let identity = match &snapshot.identity {
        Some(identity) => identity,
        None => return GateDecision::Denied,
    };

    // Role is a closed enum: anything that parsed is one of these three, and
    // an unparsed tag already resolved to None upstream.
    let permitted = match identity.role {
        None => false,
        Some(Role::Admin) => allowed.contains(&Role::Admin),
        Some(Role::Trainer) => allowed.contains(&Role::Trainer),
        Some(Role::Broker) => allowed.contains(&Role::Broker),
    };

    if permitted {
        GateDecision::Granted(identity.clone())
    } else {
        GateDecision::Denied
    }
}

/// Reactive gate over the resolver's watch channel: waits out the loading
/// phase, then yields the first settled decision. Subsequent calls observe
/// later transitions through the same receiver.
pub struct AccessGate {
    rx: watch::Receiver<AuthSnapshot>,
}

impl AccessGate {
    pub fn new(rx: watch::Receiver<AuthSnapshot>) -> Self {
        Self { rx }
    }

    /// Resolve to `Granted` or `Denied`, never `Pending`. If the resolver is
    /// dropped while still loading, the gate denies.
    pub async fn wait(&mut self, allowed: &[Role]) -> GateDecision {
        loop {
            let decision = {
                let snapshot = self.rx.borrow_and_update();
                evaluate(&snapshot, allowed)
            };
            if decision != GateDecision::Pending {
                return decision;
            }
            if self.rx.changed().await.is_err() {
                return GateDecision::Denied;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::AuthContext;
    use crate::auth::identity::test_support::{session_for, FakeRoleLookup};
    use crate::auth::identity::{AuthEvent, RoleSource};
    use std::sync::Arc;
    use uuid::Uuid;

    fn identity(role: Option<Role>) -> Identity {
        Identity { user_id: Uuid::new_v4(), email: "user@suq.example.com".to_string(), role }
    }

    fn settled(identity_value: Option<Identity>) -> AuthSnapshot {
        AuthSnapshot { identity: identity_value, loading: false }
    }

    #[test]
    fn pending_while_loading_regardless_of_identity() {
        let loading = AuthSnapshot { identity: Some(identity(Some(Role::Admin))), loading: true };
        assert_eq!(evaluate(&loading, &[Role::Admin]), GateDecision::Pending);
        assert_eq!(evaluate(&AuthSnapshot::default(), &[Role::Admin]), GateDecision::Pending);
    }

    #[test]
    fn grants_allowed_role_once_settled() {
        let snapshot = settled(Some(identity(Some(Role::Admin))));
        match evaluate(&snapshot, &[Role::Admin]) {
            GateDecision::Granted(id) => assert_eq!(id.role, Some(Role::Admin)),
            other => panic!("expected grant, got {:?}", other),
        }
    }

    #[test]
    fn denies_role_outside_allow_list() {
        let snapshot = settled(Some(identity(Some(Role::Admin))));
        assert_eq!(evaluate(&snapshot, &[Role::Trainer]), GateDecision::Denied);
        assert_eq!(evaluate(&snapshot, &[Role::Trainer, Role::Broker]), GateDecision::Denied);
    }

    #[test]
    fn denies_missing_identity_and_missing_role() {
        assert_eq!(evaluate(&settled(None), &[Role::Admin]), GateDecision::Denied);
        let unroled = settled(Some(identity(None)));
        assert_eq!(evaluate(&unroled, &[Role::Admin]), GateDecision::Denied);
        assert_eq!(evaluate(&unroled, &Role::ALL), GateDecision::Denied);
    }

    #[test]
    fn empty_allow_list_denies_everyone() {
        let snapshot = settled(Some(identity(Some(Role::Broker))));
        assert_eq!(evaluate(&snapshot, &[]), GateDecision::Denied);
    }

    #[tokio::test]
    async fn wait_blocks_through_loading_then_grants() {
        let user = Uuid::new_v4();
        let ctx = Arc::new(AuthContext::new(RoleSource::SessionMetadata, Arc::new(FakeRoleLookup::new())));
        let mut gate = AccessGate::new(ctx.subscribe());

        let waiter = tokio::spawn(async move { gate.wait(&[Role::Trainer]).await });
        // The gate must not settle while the resolver is still loading.
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        ctx.on_session_change(AuthEvent::SignedIn, Some(session_for(user, Some("trainer")))).await;
        match waiter.await.unwrap() {
            GateDecision::Granted(id) => assert_eq!(id.user_id, user),
            other => panic!("expected grant, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn wait_denies_after_sign_out_resolution() {
        let ctx = Arc::new(AuthContext::new(RoleSource::SessionMetadata, Arc::new(FakeRoleLookup::new())));
        let mut gate = AccessGate::new(ctx.subscribe());

        ctx.on_session_change(AuthEvent::SignedOut, None).await;
        assert_eq!(gate.wait(&Role::ALL).await, GateDecision::Denied);
    }

    #[tokio::test]
    async fn wait_denies_when_resolver_is_dropped() {
        let ctx = AuthContext::new(RoleSource::SessionMetadata, Arc::new(FakeRoleLookup::new()));
        let mut gate = AccessGate::new(ctx.subscribe());
        drop(ctx);
        assert_eq!(gate.wait(&[Role::Admin]).await, GateDecision::Denied);
    }
}
