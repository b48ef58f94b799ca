//! Role administration commands.
//!
//! The only way to take the admin role away; the site itself never revokes.
//! Identities must already exist (sign up through `POST /auth/register`).

use folio_core::{AppRole, Email, EmailError};
use folio_site::db::{IdentityStore, PgStore, RepositoryError, RoleStore};
use folio_site::models::Identity;
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during role administration.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No identity registered with email: {0}")]
    UnknownIdentity(Email),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

async fn find_identity(store: &PgStore, email: &str) -> Result<Identity, AdminError> {
    let email = Email::parse(email)?;
    store
        .identity_by_email(&email)
        .await?
        .ok_or(AdminError::UnknownIdentity(email))
}

/// Grant `role` to the identity registered under `email`. Granting a role the
/// identity already holds is a no-op.
pub async fn grant(email: &str, role: AppRole) -> Result<(), AdminError> {
    let store = PgStore::new(connect().await?);
    let identity = find_identity(&store, email).await?;

    if store.grant_role(identity.id, role).await? {
        tracing::info!("Granted {} to {} ({})", role, identity.email, identity.id);
    } else {
        tracing::info!("{} already has the {} role", identity.email, role);
    }
    Ok(())
}

/// Revoke `role` from the identity registered under `email`.
///
/// Active sessions keep their resolved admin flag until they sign in again.
pub async fn revoke(email: &str, role: AppRole) -> Result<(), AdminError> {
    let store = PgStore::new(connect().await?);
    let identity = find_identity(&store, email).await?;

    if store.revoke_role(identity.id, role).await? {
        tracing::info!("Revoked {} from {} ({})", role, identity.email, identity.id);
    } else {
        tracing::warn!("{} did not have the {} role", identity.email, role);
    }
    Ok(())
}

/// Log every role assignment, oldest first.
pub async fn list() -> Result<(), AdminError> {
    let store = PgStore::new(connect().await?);
    let assignments = store.role_assignments().await?;

    if assignments.is_empty() {
        tracing::info!("No role assignments. Bootstrap the first admin from the site or run `admin grant`.");
        return Ok(());
    }

    for assignment in &assignments {
        tracing::info!(
            "{:<10} {:<40} {} (since {})",
            assignment.role,
            assignment.email,
            assignment.identity_id,
            assignment.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    tracing::info!("{} assignment(s)", assignments.len());
    Ok(())
}
