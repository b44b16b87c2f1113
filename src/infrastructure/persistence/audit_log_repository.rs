use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{map_row_to_audit_log, AUDIT_LOG_COLUMNS};
use crate::domain::entities::AuditLog;
use crate::domain::repositories::{AuditLogFilter, AuditLogRepository};
use crate::presentation::middleware::error::AppError;

/// `PostgreSQL` implementation of `AuditLogRepository`
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn insert(&self, entry: &AuditLog) -> Result<(), AppError> {
        sqlx::query(
            r"
            INSERT INTO audit_logs
            (id, tenant_id, actor_id, action, entity_type, entity_id, metadata, trace_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(entry.id.as_uuid())
        .bind(entry.tenant_id.map(|id| id.as_uuid()))
        .bind(entry.actor_id.map(|id| id.as_uuid()))
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.metadata)
        .bind(&entry.trace_id)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, filter: AuditLogFilter) -> Result<Vec<AuditLog>, AppError> {
        // NULL tenant filter means all tenants
        let rows = sqlx::query(&format!(
            "SELECT {AUDIT_LOG_COLUMNS} FROM audit_logs \
             WHERE ($1::uuid IS NULL OR tenant_id = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(filter.tenant_id.map(|id| id.as_uuid()))
        .bind(i64::from(filter.page.limit))
        .bind(i64::from(filter.page.offset))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_audit_log).collect()
    }
}
