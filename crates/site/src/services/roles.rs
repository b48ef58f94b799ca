//! Role resolution.

use folio_core::{AppRole, IdentityId};

use crate::db::RoleStore;

/// Resolve the admin flag for an identity.
///
/// True iff at least one `admin` role row exists for the identity. Duplicate
/// rows are tolerated. A failed lookup is logged and treated as not admin;
/// there is no retry.
#[tracing::instrument(skip(store))]
pub async fn resolve_role<S: RoleStore>(store: &S, identity: IdentityId) -> bool {
    match store.roles_for(identity).await {
        Ok(roles) => roles.contains(&AppRole::Admin),
        Err(e) => {
            tracing::warn!(error = %e, %identity, "Role lookup failed, treating identity as not admin");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_no_roles_is_not_admin() {
        let store = MemoryStore::new();
        assert!(!resolve_role(&store, IdentityId::generate()).await);
    }

    #[tokio::test]
    async fn test_admin_row_grants_flag() {
        let store = MemoryStore::new();
        let identity = IdentityId::generate();
        store.grant_role(identity, AppRole::Moderator).await.unwrap();
        assert!(!resolve_role(&store, identity).await);

        store.grant_role(identity, AppRole::Admin).await.unwrap();
        assert!(resolve_role(&store, identity).await);
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_to_false() {
        let store = MemoryStore::new();
        let identity = IdentityId::generate();
        store.grant_role(identity, AppRole::Admin).await.unwrap();

        store.set_unavailable(true);
        assert!(!resolve_role(&store, identity).await);
    }
}
