use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::rows::{capacity_to_db, map_row_to_event, EVENT_COLUMNS};
use crate::domain::entities::{Event, EventId, TenantId};
use crate::domain::repositories::{EventRepository, Page};
use crate::domain::value_objects::EventStatus;
use crate::presentation::middleware::error::AppError;

/// `PostgreSQL` implementation of `EventRepository`
#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn create(&self, event: &Event) -> Result<(), AppError> {
        sqlx::query(
            r"
            INSERT INTO events
            (id, tenant_id, title, description, location, starts_at, ends_at, capacity,
             requires_approval, status, cover_image_key, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(event.id.as_uuid())
        .bind(event.tenant_id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(capacity_to_db(event.capacity)?)
        .bind(event.requires_approval)
        .bind(event.status.as_str())
        .bind(&event.cover_image_key)
        .bind(event.created_by.as_uuid())
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), AppError> {
        let result = sqlx::query(
            r"
            UPDATE events
            SET title = $2, description = $3, location = $4, starts_at = $5, ends_at = $6,
                capacity = $7, requires_approval = $8, status = $9, cover_image_key = $10,
                updated_at = $11
            WHERE id = $1
            ",
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(capacity_to_db(event.capacity)?)
        .bind(event.requires_approval)
        .bind(event.status.as_str())
        .bind(&event.cover_image_key)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { resource: "event".to_string() });
        }

        Ok(())
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, AppError> {
        let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_event).transpose()
    }

    async fn list_by_tenant(&self, tenant_id: TenantId, page: Page) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE tenant_id = $1 \
             ORDER BY starts_at LIMIT $2 OFFSET $3"
        ))
        .bind(tenant_id.as_uuid())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_event).collect()
    }

    async fn list_published(
        &self,
        from: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = $1 AND starts_at >= $2 \
             ORDER BY starts_at LIMIT $3 OFFSET $4"
        ))
        .bind(EventStatus::Published.as_str())
        .bind(from)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_event).collect()
    }
}
