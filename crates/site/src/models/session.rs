//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use folio_core::{Email, IdentityId};

use super::Identity;

/// Session-stored identity.
///
/// Minimal data stored in the session to identify the signed-in visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentIdentity {
    /// Identity's database ID.
    pub id: IdentityId,
    /// Identity's email address.
    pub email: Email,
}

impl From<&Identity> for CurrentIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
        }
    }
}

/// Result of the last role resolution for the session's identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    /// The role lookup has not completed for the current identity.
    #[default]
    Unresolved,
    Admin,
    NotAdmin,
}

impl AdminStatus {
    #[must_use]
    pub const fn from_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::NotAdmin }
    }
}

/// A session-local admin bypass recorded by the bypass bootstrap path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassGrant {
    /// The identity that recorded the bypass.
    pub identity: IdentityId,
    /// When it was recorded, in epoch milliseconds.
    pub granted_at_ms: i64,
}

/// Authentication state for one session.
///
/// Rebuilt from the session on every request and recomputed whenever the
/// identity changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub identity: Option<CurrentIdentity>,
    pub admin: AdminStatus,
    pub bypass: Option<BypassGrant>,
}

impl AuthContext {
    /// Context for a visitor who is not signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// True while the role lookup for a signed-in identity is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.identity.is_some() && self.admin == AdminStatus::Unresolved
    }

    /// True if the resolved admin flag is set.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.is_some() && self.admin == AdminStatus::Admin
    }

    /// True if a bypass was recorded by the current identity.
    #[must_use]
    pub fn has_bypass(&self) -> bool {
        match (&self.identity, &self.bypass) {
            (Some(identity), Some(grant)) => grant.identity == identity.id,
            _ => false,
        }
    }

    /// Whether admin routes are reachable. The bypass counts only when the
    /// deployment allows it.
    #[must_use]
    pub fn has_admin_access(&self, allow_bypass: bool) -> bool {
        self.is_admin() || (allow_bypass && self.has_bypass())
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in identity.
    pub const CURRENT_IDENTITY: &str = "current_identity";

    /// Key for the resolved admin status.
    pub const ADMIN_STATUS: &str = "admin_status";

    /// Key for the identity that recorded an admin bypass.
    pub const ADMIN_BYPASS: &str = "admin-bypass";

    /// Key for when the admin bypass was recorded (epoch ms).
    pub const ADMIN_BYPASS_TIMESTAMP: &str = "admin-bypass-timestamp";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identity() -> CurrentIdentity {
        CurrentIdentity {
            id: IdentityId::generate(),
            email: Email::parse("owner@example.com").unwrap(),
        }
    }

    #[test]
    fn test_anonymous_context() {
        let context = AuthContext::anonymous();
        assert!(!context.is_loading());
        assert!(!context.is_admin());
        assert!(!context.has_admin_access(true));
    }

    #[test]
    fn test_loading_until_resolved() {
        let mut context = AuthContext {
            identity: Some(identity()),
            ..AuthContext::default()
        };
        assert!(context.is_loading());
        assert!(!context.has_admin_access(false));

        context.admin = AdminStatus::from_flag(true);
        assert!(!context.is_loading());
        assert!(context.has_admin_access(false));
    }

    #[test]
    fn test_bypass_only_for_recording_identity() {
        let current = identity();
        let mut context = AuthContext {
            identity: Some(current.clone()),
            admin: AdminStatus::NotAdmin,
            bypass: Some(BypassGrant {
                identity: current.id,
                granted_at_ms: 1_700_000_000_000,
            }),
        };
        assert!(context.has_admin_access(true));
        assert!(!context.has_admin_access(false));

        context.bypass = Some(BypassGrant {
            identity: IdentityId::generate(),
            granted_at_ms: 1_700_000_000_000,
        });
        assert!(!context.has_admin_access(true));
    }
}
