use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{map_row_to_membership, map_row_to_tenant, map_row_to_user, TENANT_COLUMNS};
use crate::domain::entities::{
    Tenant, TenantAccess, TenantId, TenantMember, TenantMembership, UserId,
};
use crate::domain::repositories::{Page, TenantRepository};
use crate::domain::value_objects::TenantStatus;
use crate::presentation::middleware::error::AppError;

/// `PostgreSQL` implementation of `TenantRepository`
#[derive(Clone)]
pub struct PostgresTenantRepository {
    pool: PgPool,
}

impl PostgresTenantRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_MEMBERSHIP: &str = r"
    INSERT INTO tenant_memberships (tenant_id, user_id, role, created_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (tenant_id, user_id) DO UPDATE SET role = EXCLUDED.role
";

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn create(
        &self,
        tenant: &Tenant,
        owner: Option<&TenantMembership>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO tenants (id, name, slug, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(tenant.id.as_uuid())
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(tenant.status.as_str())
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&mut *tx)
        .await?;

        if let Some(owner) = owner {
            sqlx::query(INSERT_MEMBERSHIP)
                .bind(owner.tenant_id.as_uuid())
                .bind(owner.user_id.as_uuid())
                .bind(owner.role.as_str())
                .bind(owner.created_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, AppError> {
        let row = sqlx::query(&format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_tenant).transpose()
    }

    async fn list(&self, page: Page) -> Result<Vec<Tenant>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_tenant).collect()
    }

    async fn set_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> Result<Option<Tenant>, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE tenants SET status = $2, updated_at = now() WHERE id = $1 RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_tenant).transpose()
    }

    async fn find_access(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> Result<Option<TenantAccess>, AppError> {
        let row = sqlx::query(
            r"
            SELECT t.id, t.name, t.slug, t.status, t.created_at, t.updated_at,
                   m.tenant_id AS m_tenant_id, m.user_id AS m_user_id,
                   m.role AS m_role, m.created_at AS m_created_at
            FROM tenants t
            LEFT JOIN tenant_memberships m ON m.tenant_id = t.id AND m.user_id = $2
            WHERE t.id = $1
            ",
        )
        .bind(tenant_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(TenantAccess {
            tenant: map_row_to_tenant(&row)?,
            membership: map_row_to_membership(&row, "m_")?,
        }))
    }

    async fn upsert_member(&self, membership: &TenantMembership) -> Result<(), AppError> {
        sqlx::query(INSERT_MEMBERSHIP)
            .bind(membership.tenant_id.as_uuid())
            .bind(membership.user_id.as_uuid())
            .bind(membership.role.as_str())
            .bind(membership.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_members(&self, tenant_id: TenantId) -> Result<Vec<TenantMember>, AppError> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.email, u.password_hash, u.full_name, u.role, u.is_active,
                   u.created_at, u.updated_at,
                   m.tenant_id AS m_tenant_id, m.user_id AS m_user_id,
                   m.role AS m_role, m.created_at AS m_created_at
            FROM tenant_memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.tenant_id = $1
            ORDER BY m.created_at
            ",
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let membership = map_row_to_membership(row, "m_")?.ok_or_else(|| {
                    AppError::Internal { message: "membership row without user".to_string() }
                })?;
                Ok(TenantMember { membership, user: map_row_to_user(row)? })
            })
            .collect()
    }
}
