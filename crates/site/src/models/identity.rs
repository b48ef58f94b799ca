//! Identity and role assignment types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use folio_core::{AppRole, Email, IdentityId, RoleAssignmentId};

/// A sign-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Unique identity ID.
    pub id: IdentityId,
    /// Sign-in email address.
    pub email: Email,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
}

/// A role granted to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    pub id: RoleAssignmentId,
    pub identity_id: IdentityId,
    /// Email of the identity, joined for operator listings.
    pub email: Email,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
}
