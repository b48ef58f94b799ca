//! Role assignments and the role-write policy.

use chrono::{DateTime, Utc};

use folio_core::{AppRole, IdentityId, RoleAssignmentId};

use super::{PgStore, stored_email};
use crate::db::{RepositoryError, RoleStore};
use crate::models::RoleAssignment;

/// Advisory lock key held while a self-service role write checks the policy.
const ROLE_WRITE_LOCK: i64 = 0x666f_6c69_6f72;

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: RoleAssignmentId,
    user_id: IdentityId,
    email: String,
    role: AppRole,
    created_at: DateTime<Utc>,
}

impl TryFrom<AssignmentRow> for RoleAssignment {
    type Error = RepositoryError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            identity_id: row.user_id,
            email: stored_email(&row.email)?,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

impl RoleStore for PgStore {
    async fn roles_for(&self, identity: IdentityId) -> Result<Vec<AppRole>, RepositoryError> {
        let roles: Vec<(AppRole,)> =
            sqlx::query_as("SELECT role FROM public.user_roles WHERE user_id = $1")
                .bind(identity)
                .fetch_all(&self.pool)
                .await?;

        Ok(roles.into_iter().map(|(role,)| role).collect())
    }

    async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM public.user_roles WHERE role = 'admin')",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_role(&self, identity: IdentityId, role: AppRole) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent self-service writes so only one first admin lands.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ROLE_WRITE_LOCK)
            .execute(&mut *tx)
            .await?;

        let (assigned, admin_exists): (bool, bool) = sqlx::query_as(
            r"
            SELECT
                EXISTS (SELECT 1 FROM public.user_roles WHERE user_id = $1 AND role = $2),
                EXISTS (SELECT 1 FROM public.user_roles WHERE role = 'admin')
            ",
        )
        .bind(identity)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        if assigned {
            return Err(RepositoryError::Conflict("role already assigned".to_owned()));
        }
        if admin_exists {
            return Err(RepositoryError::PolicyViolation(
                "self-service role writes are closed once an admin exists".to_owned(),
            ));
        }

        sqlx::query("INSERT INTO public.user_roles (id, user_id, role) VALUES ($1, $2, $3)")
            .bind(RoleAssignmentId::generate())
            .bind(identity)
            .bind(role)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::conflict_or(e, "role already assigned"))?;

        tx.commit().await?;
        Ok(())
    }

    async fn grant_role(&self, identity: IdentityId, role: AppRole) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO public.user_roles (id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, role) DO NOTHING
            ",
        )
        .bind(RoleAssignmentId::generate())
        .bind(identity)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_role(&self, identity: IdentityId, role: AppRole) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM public.user_roles WHERE user_id = $1 AND role = $2")
            .bind(identity)
            .bind(role)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn role_assignments(&self) -> Result<Vec<RoleAssignment>, RepositoryError> {
        let rows: Vec<AssignmentRow> = sqlx::query_as(
            r"
            SELECT r.id, r.user_id, i.email, r.role, r.created_at
            FROM public.user_roles r
            JOIN identities i ON i.id = r.user_id
            ORDER BY r.created_at
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RoleAssignment::try_from).collect()
    }
}
