//! Session-backed authentication state.
//!
//! [`SessionStore`] reads and writes the [`AuthContext`] pieces kept in the
//! tower-sessions session. The context is rebuilt from the session on every
//! request and the admin status is recomputed whenever the identity changes.

use chrono::Utc;
use tower_sessions::Session;

use crate::db::RoleStore;
use crate::models::{AdminStatus, AuthContext, BypassGrant, CurrentIdentity, session_keys};
use crate::services::roles::resolve_role;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Authentication state accessor for one request's session.
pub struct SessionStore<'a> {
    session: &'a Session,
}

impl<'a> SessionStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Current authentication context.
    ///
    /// # Errors
    ///
    /// Returns an error if the session backend fails.
    pub async fn context(&self) -> SessionResult<AuthContext> {
        let Some(identity) = self
            .session
            .get::<CurrentIdentity>(session_keys::CURRENT_IDENTITY)
            .await?
        else {
            return Ok(AuthContext::anonymous());
        };

        let admin = self
            .session
            .get::<AdminStatus>(session_keys::ADMIN_STATUS)
            .await?
            .unwrap_or_default();

        let bypass_identity = self
            .session
            .get(session_keys::ADMIN_BYPASS)
            .await?;
        let bypass_timestamp = self
            .session
            .get::<i64>(session_keys::ADMIN_BYPASS_TIMESTAMP)
            .await?;
        let bypass = bypass_identity.map(|identity| BypassGrant {
            identity,
            granted_at_ms: bypass_timestamp.unwrap_or_default(),
        });

        Ok(AuthContext {
            identity: Some(identity),
            admin,
            bypass,
        })
    }

    /// Sign an identity in and resolve its admin status.
    ///
    /// The session id is cycled and any previous identity's state is dropped,
    /// including a recorded bypass.
    ///
    /// # Errors
    ///
    /// Returns an error if the session backend fails.
    pub async fn sign_in<S: RoleStore>(
        &self,
        store: &S,
        identity: CurrentIdentity,
    ) -> SessionResult<AuthContext> {
        self.session.cycle_id().await?;
        self.clear_bypass().await?;
        self.session
            .insert(session_keys::CURRENT_IDENTITY, &identity)
            .await?;
        self.session
            .insert(session_keys::ADMIN_STATUS, AdminStatus::Unresolved)
            .await?;

        self.refresh(store).await
    }

    /// Re-run the role resolver for the current identity and store the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the session backend fails.
    pub async fn refresh<S: RoleStore>(&self, store: &S) -> SessionResult<AuthContext> {
        let mut context = self.context().await?;
        let Some(identity) = &context.identity else {
            return Ok(context);
        };

        let is_admin = resolve_role(store, identity.id).await;
        context.admin = AdminStatus::from_flag(is_admin);
        self.session
            .insert(session_keys::ADMIN_STATUS, context.admin)
            .await?;

        Ok(context)
    }

    /// Record a session-local admin bypass for the current identity.
    ///
    /// Returns `None` if nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the session backend fails.
    pub async fn record_bypass(&self) -> SessionResult<Option<BypassGrant>> {
        let context = self.context().await?;
        let Some(identity) = context.identity else {
            return Ok(None);
        };

        let grant = BypassGrant {
            identity: identity.id,
            granted_at_ms: Utc::now().timestamp_millis(),
        };
        self.session
            .insert(session_keys::ADMIN_BYPASS, grant.identity)
            .await?;
        self.session
            .insert(session_keys::ADMIN_BYPASS_TIMESTAMP, grant.granted_at_ms)
            .await?;

        Ok(Some(grant))
    }

    /// Sign out, discarding all session data.
    ///
    /// # Errors
    ///
    /// Returns an error if the session backend fails.
    pub async fn sign_out(&self) -> SessionResult<()> {
        self.session.flush().await
    }

    async fn clear_bypass(&self) -> SessionResult<()> {
        self.session
            .remove::<serde_json::Value>(session_keys::ADMIN_BYPASS)
            .await?;
        self.session
            .remove::<serde_json::Value>(session_keys::ADMIN_BYPASS_TIMESTAMP)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use folio_core::{AppRole, Email, IdentityId};

    use super::*;
    use crate::db::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    fn identity() -> CurrentIdentity {
        CurrentIdentity {
            id: IdentityId::generate(),
            email: Email::parse("owner@example.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_anonymous_session() {
        let session = session();
        let context = SessionStore::new(&session).context().await.unwrap();
        assert_eq!(context, AuthContext::anonymous());
    }

    #[tokio::test]
    async fn test_sign_in_resolves_admin_flag() {
        let store = MemoryStore::new();
        let session = session();
        let sessions = SessionStore::new(&session);
        let current = identity();

        let context = sessions.sign_in(&store, current.clone()).await.unwrap();
        assert!(!context.is_loading());
        assert!(!context.is_admin());

        store.grant_role(current.id, AppRole::Admin).await.unwrap();
        // The flag is only recomputed on refresh.
        assert!(!sessions.context().await.unwrap().is_admin());
        assert!(sessions.refresh(&store).await.unwrap().is_admin());
        assert!(sessions.context().await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_bypass_dropped_on_identity_change() {
        let store = MemoryStore::new();
        let session = session();
        let sessions = SessionStore::new(&session);

        sessions.sign_in(&store, identity()).await.unwrap();
        let grant = sessions.record_bypass().await.unwrap().unwrap();
        let context = sessions.context().await.unwrap();
        assert_eq!(context.bypass, Some(grant));
        assert!(context.has_admin_access(true));

        let context = sessions.sign_in(&store, identity()).await.unwrap();
        assert_eq!(context.bypass, None);
        assert!(!context.has_admin_access(true));
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let store = MemoryStore::new();
        let session = session();
        let sessions = SessionStore::new(&session);

        sessions.sign_in(&store, identity()).await.unwrap();
        sessions.sign_out().await.unwrap();
        assert_eq!(sessions.context().await.unwrap(), AuthContext::anonymous());
        assert_eq!(sessions.record_bypass().await.unwrap(), None);
    }
}
