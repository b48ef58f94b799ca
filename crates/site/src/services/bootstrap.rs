//! Admin bootstrap.
//!
//! Moves a signed-in identity from unprivileged to privileged through one of
//! three paths, all decided here rather than by the client:
//!
//! - **self-service**: a plain role insert, admitted by the store only while no
//!   admin exists
//! - **setup key**: a conflict-ignoring grant, gated on the configured passphrase
//! - **bypass**: no role write; records a session-local grant, honored only
//!   when the deployment enables it
//!
//! There is no way back: revocation happens through the CLI.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use folio_core::{AppRole, IdentityId};

use crate::config::BootstrapConfig;
use crate::db::{RepositoryError, RoleStore};
use crate::models::{AuthContext, BypassGrant, CurrentIdentity};
use crate::services::session::SessionStore;

/// The SQL an operator can run by hand to grant the admin role.
#[must_use]
pub fn manual_setup_sql(identity: IdentityId) -> String {
    format!(
        "INSERT INTO public.user_roles (user_id, role) VALUES ('{identity}', 'admin') ON CONFLICT DO NOTHING;"
    )
}

/// Which bootstrap path to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapMethod {
    SelfService,
    SetupKey,
    Bypass,
}

/// Bootstrap request body.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapRequest {
    pub method: BootstrapMethod,
    /// Required for [`BootstrapMethod::SetupKey`].
    #[serde(default)]
    pub setup_key: Option<String>,
}

/// Successful bootstrap results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A new admin role row was written.
    Granted,
    /// The identity already held the admin role.
    AlreadyAdmin,
    /// A session-local bypass was recorded.
    BypassRecorded(BypassGrant),
}

impl BootstrapOutcome {
    /// User-facing message for the outcome.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Granted => "Admin role added successfully",
            Self::AlreadyAdmin => "You already have the admin role",
            Self::BypassRecorded(_) => "Temporary admin bypass enabled for this session",
        }
    }
}

/// Bootstrap failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The role-write policy refused the self-service insert.
    #[error("unable to auto-assign the admin role")]
    PolicyRejected {
        /// Statement an operator can run instead.
        sql: String,
    },

    #[error("invalid admin setup key")]
    InvalidSetupKey,

    #[error("a setup key is required for this method")]
    MissingSetupKey,

    #[error("keyed admin setup is not enabled")]
    SetupKeyDisabled,

    #[error("admin bypass is not enabled")]
    BypassDisabled,

    /// The session lost its identity mid-request.
    #[error("not signed in")]
    NotSignedIn,

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// What the bootstrap page shows for the signed-in identity.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapStatus {
    pub identity: CurrentIdentity,
    pub is_admin: bool,
    /// Whether any admin exists; self-service only works while this is false.
    pub admin_exists: bool,
    pub setup_key_enabled: bool,
    pub bypass_enabled: bool,
    pub bypass_active: bool,
    /// Manual setup statement for the clipboard fallback.
    pub manual_sql: String,
}

/// The bootstrap flow for one request.
pub struct BootstrapFlow<'a, S> {
    store: &'a S,
    config: &'a BootstrapConfig,
}

impl<'a, S: RoleStore> BootstrapFlow<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, config: &'a BootstrapConfig) -> Self {
        Self { store, config }
    }

    /// Current bootstrap state for a signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError::Repository` if the admin lookup fails.
    pub async fn status(
        &self,
        identity: &CurrentIdentity,
        context: &AuthContext,
    ) -> Result<BootstrapStatus, BootstrapError> {
        Ok(BootstrapStatus {
            identity: identity.clone(),
            is_admin: context.is_admin(),
            admin_exists: self.store.admin_exists().await?,
            setup_key_enabled: self.config.setup_key_enabled(),
            bypass_enabled: self.config.allow_bypass,
            bypass_active: self.config.allow_bypass && context.has_bypass(),
            manual_sql: manual_setup_sql(identity.id),
        })
    }

    /// Run a bootstrap method for the signed-in identity, then refresh the
    /// session's admin status.
    ///
    /// # Errors
    ///
    /// See [`BootstrapError`]. A refused method leaves the identity unprivileged.
    #[tracing::instrument(skip(self, sessions, identity, request), fields(method = ?request.method, identity = %identity.id))]
    pub async fn run(
        &self,
        sessions: &SessionStore<'_>,
        identity: &CurrentIdentity,
        request: &BootstrapRequest,
    ) -> Result<BootstrapOutcome, BootstrapError> {
        let outcome = match request.method {
            BootstrapMethod::SelfService => self.self_service(identity.id).await?,
            BootstrapMethod::SetupKey => {
                self.with_setup_key(identity.id, request.setup_key.as_deref())
                    .await?
            }
            BootstrapMethod::Bypass => {
                if !self.config.allow_bypass {
                    return Err(BootstrapError::BypassDisabled);
                }
                match sessions.record_bypass().await? {
                    Some(grant) => BootstrapOutcome::BypassRecorded(grant),
                    None => return Err(BootstrapError::NotSignedIn),
                }
            }
        };

        if !matches!(outcome, BootstrapOutcome::BypassRecorded(_)) {
            sessions.refresh(self.store).await?;
        }

        tracing::info!(outcome = ?outcome, "Admin bootstrap completed");
        Ok(outcome)
    }

    /// Self-service insert. A uniqueness conflict means the identity is
    /// already admin.
    async fn self_service(&self, identity: IdentityId) -> Result<BootstrapOutcome, BootstrapError> {
        match self.store.insert_role(identity, AppRole::Admin).await {
            Ok(()) => Ok(BootstrapOutcome::Granted),
            Err(RepositoryError::Conflict(_)) => Ok(BootstrapOutcome::AlreadyAdmin),
            Err(RepositoryError::PolicyViolation(reason)) => {
                tracing::warn!(%reason, "Self-service admin insert refused by policy");
                Err(BootstrapError::PolicyRejected {
                    sql: manual_setup_sql(identity),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Keyed force-insert with conflict-ignored semantics.
    async fn with_setup_key(
        &self,
        identity: IdentityId,
        supplied: Option<&str>,
    ) -> Result<BootstrapOutcome, BootstrapError> {
        let expected = self.config.setup_key().ok_or(BootstrapError::SetupKeyDisabled)?;
        let supplied = supplied
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(BootstrapError::MissingSetupKey)?;

        if !keys_match(supplied, expected) {
            tracing::warn!(%identity, "Admin setup attempted with an invalid key");
            return Err(BootstrapError::InvalidSetupKey);
        }

        if self.store.grant_role(identity, AppRole::Admin).await? {
            Ok(BootstrapOutcome::Granted)
        } else {
            Ok(BootstrapOutcome::AlreadyAdmin)
        }
    }
}

/// Compare two keys through their digests without short-circuiting.
fn keys_match(supplied: &str, expected: &str) -> bool {
    let a = Sha256::digest(supplied.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;
    use tower_sessions::Session;

    use folio_core::Email;

    use super::*;
    use crate::db::MemoryStore;

    const KEY: &str = "k7#Qm2!vX9pL4wZr";

    fn config(setup_key: Option<&str>, allow_bypass: bool) -> BootstrapConfig {
        BootstrapConfig {
            setup_key: setup_key.map(|key| SecretString::from(key.to_owned())),
            allow_bypass,
        }
    }

    fn session() -> Session {
        Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    async fn signed_in(store: &MemoryStore, session: &Session) -> CurrentIdentity {
        let identity = CurrentIdentity {
            id: IdentityId::generate(),
            email: Email::parse("owner@example.com").unwrap(),
        };
        SessionStore::new(session)
            .sign_in(store, identity.clone())
            .await
            .unwrap();
        identity
    }

    fn request(method: BootstrapMethod, setup_key: Option<&str>) -> BootstrapRequest {
        BootstrapRequest {
            method,
            setup_key: setup_key.map(str::to_owned),
        }
    }

    #[test]
    fn test_manual_setup_sql() {
        let id = IdentityId::generate();
        assert_eq!(
            manual_setup_sql(id),
            format!(
                "INSERT INTO public.user_roles (user_id, role) VALUES ('{id}', 'admin') ON CONFLICT DO NOTHING;"
            )
        );
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match(KEY, KEY));
        assert!(!keys_match("k7#Qm2!vX9pL4wZ", KEY));
        assert!(!keys_match("", KEY));
    }

    #[tokio::test]
    async fn test_self_service_grants_first_admin() {
        let store = MemoryStore::new();
        let session = session();
        let identity = signed_in(&store, &session).await;
        let sessions = SessionStore::new(&session);
        let config = config(None, false);
        let flow = BootstrapFlow::new(&store, &config);

        let outcome = flow
            .run(&sessions, &identity, &request(BootstrapMethod::SelfService, None))
            .await
            .unwrap();
        assert_eq!(outcome, BootstrapOutcome::Granted);
        assert!(sessions.context().await.unwrap().is_admin());

        let again = flow
            .run(&sessions, &identity, &request(BootstrapMethod::SelfService, None))
            .await
            .unwrap();
        assert_eq!(again, BootstrapOutcome::AlreadyAdmin);
        assert_eq!(store.roles_for(identity.id).await.unwrap(), [AppRole::Admin]);
    }

    #[tokio::test]
    async fn test_self_service_refused_once_admin_exists() {
        let store = MemoryStore::new();
        store
            .grant_role(IdentityId::generate(), AppRole::Admin)
            .await
            .unwrap();

        let session = session();
        let identity = signed_in(&store, &session).await;
        let sessions = SessionStore::new(&session);
        let config = config(None, false);

        let err = BootstrapFlow::new(&store, &config)
            .run(&sessions, &identity, &request(BootstrapMethod::SelfService, None))
            .await
            .unwrap_err();
        match err {
            BootstrapError::PolicyRejected { sql } => {
                assert_eq!(sql, manual_setup_sql(identity.id));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!sessions.context().await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_setup_key_paths() {
        let store = MemoryStore::new();
        store
            .grant_role(IdentityId::generate(), AppRole::Admin)
            .await
            .unwrap();
        let session = session();
        let identity = signed_in(&store, &session).await;
        let sessions = SessionStore::new(&session);

        let disabled = config(None, false);
        assert!(matches!(
            BootstrapFlow::new(&store, &disabled)
                .run(&sessions, &identity, &request(BootstrapMethod::SetupKey, Some(KEY)))
                .await,
            Err(BootstrapError::SetupKeyDisabled)
        ));

        let enabled = config(Some(KEY), false);
        let flow = BootstrapFlow::new(&store, &enabled);
        assert!(matches!(
            flow.run(&sessions, &identity, &request(BootstrapMethod::SetupKey, None))
                .await,
            Err(BootstrapError::MissingSetupKey)
        ));
        assert!(matches!(
            flow.run(&sessions, &identity, &request(BootstrapMethod::SetupKey, Some("wrong")))
                .await,
            Err(BootstrapError::InvalidSetupKey)
        ));

        let outcome = flow
            .run(&sessions, &identity, &request(BootstrapMethod::SetupKey, Some(KEY)))
            .await
            .unwrap();
        assert_eq!(outcome, BootstrapOutcome::Granted);
        assert!(sessions.context().await.unwrap().is_admin());

        let again = flow
            .run(&sessions, &identity, &request(BootstrapMethod::SetupKey, Some(KEY)))
            .await
            .unwrap();
        assert_eq!(again, BootstrapOutcome::AlreadyAdmin);
    }

    #[tokio::test]
    async fn test_setup_key_ignores_surrounding_whitespace() {
        let store = MemoryStore::new();
        let session = session();
        let identity = signed_in(&store, &session).await;
        let sessions = SessionStore::new(&session);

        let padded = config(Some(&format!("  {KEY}\n")), false);
        let outcome = BootstrapFlow::new(&store, &padded)
            .run(&sessions, &identity, &request(BootstrapMethod::SetupKey, Some(KEY)))
            .await
            .unwrap();
        assert_eq!(outcome, BootstrapOutcome::Granted);
    }

    #[tokio::test]
    async fn test_bypass_requires_opt_in() {
        let store = MemoryStore::new();
        let session = session();
        let identity = signed_in(&store, &session).await;
        let sessions = SessionStore::new(&session);

        let disabled = config(None, false);
        assert!(matches!(
            BootstrapFlow::new(&store, &disabled)
                .run(&sessions, &identity, &request(BootstrapMethod::Bypass, None))
                .await,
            Err(BootstrapError::BypassDisabled)
        ));

        let enabled = config(None, true);
        let outcome = BootstrapFlow::new(&store, &enabled)
            .run(&sessions, &identity, &request(BootstrapMethod::Bypass, None))
            .await
            .unwrap();
        assert!(matches!(outcome, BootstrapOutcome::BypassRecorded(grant) if grant.identity == identity.id));

        let context = sessions.context().await.unwrap();
        assert!(!context.is_admin());
        assert!(context.has_admin_access(true));
        assert!(!store.admin_exists().await.unwrap());
    }
}
