//! Row-to-entity mapping shared by the Postgres repositories.

use sqlx::postgres::PgRow;
use sqlx::Row;
use std::str::FromStr;

use crate::domain::entities::{AuditLog, Booking, Event, Tenant, TenantMembership, User};
use crate::domain::value_objects::Email;
use crate::presentation::middleware::error::AppError;

pub(super) const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, role, is_active, created_at, updated_at";
pub(super) const TENANT_COLUMNS: &str = "id, name, slug, status, created_at, updated_at";
pub(super) const EVENT_COLUMNS: &str = "id, tenant_id, title, description, location, starts_at, \
     ends_at, capacity, requires_approval, status, cover_image_key, created_by, created_at, updated_at";
pub(super) const BOOKING_COLUMNS: &str =
    "id, event_id, user_id, status, note, created_at, updated_at";
pub(super) const AUDIT_LOG_COLUMNS: &str =
    "id, tenant_id, actor_id, action, entity_type, entity_id, metadata, trace_id, created_at";

/// Parse a text column holding an enum value
fn parse_column<T>(row: &PgRow, column: &str) -> Result<T, AppError>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e| AppError::Internal { message: format!("corrupt {column} column: {e}") })
}

pub(super) fn map_row_to_user(row: &PgRow) -> Result<User, AppError> {
    let email: String = row.try_get("email")?;
    let email = Email::parse(&email)
        .map_err(|e| AppError::Internal { message: format!("corrupt email column: {e}") })?;

    Ok(User {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        email,
        password_hash: row.try_get("password_hash")?,
        full_name: row.try_get("full_name")?,
        role: parse_column(row, "role")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(super) fn map_row_to_tenant(row: &PgRow) -> Result<Tenant, AppError> {
    Ok(Tenant {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Membership columns are read under a prefix so they can share a row with a join
pub(super) fn map_row_to_membership(
    row: &PgRow,
    prefix: &str,
) -> Result<Option<TenantMembership>, AppError> {
    let user_id: Option<uuid::Uuid> = row.try_get(format!("{prefix}user_id").as_str())?;
    let Some(user_id) = user_id else {
        return Ok(None);
    };

    Ok(Some(TenantMembership {
        tenant_id: row.try_get::<uuid::Uuid, _>(format!("{prefix}tenant_id").as_str())?.into(),
        user_id: user_id.into(),
        role: parse_column(row, &format!("{prefix}role"))?,
        created_at: row.try_get(format!("{prefix}created_at").as_str())?,
    }))
}

pub(super) fn map_row_to_event(row: &PgRow) -> Result<Event, AppError> {
    let capacity: i32 = row.try_get("capacity")?;

    Ok(Event {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        tenant_id: row.try_get::<uuid::Uuid, _>("tenant_id")?.into(),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        starts_at: row.try_get("starts_at")?,
        ends_at: row.try_get("ends_at")?,
        capacity: capacity.max(0) as u32,
        requires_approval: row.try_get("requires_approval")?,
        status: parse_column(row, "status")?,
        cover_image_key: row.try_get("cover_image_key")?,
        created_by: row.try_get::<uuid::Uuid, _>("created_by")?.into(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(super) fn map_row_to_booking(row: &PgRow) -> Result<Booking, AppError> {
    Ok(Booking {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        event_id: row.try_get::<uuid::Uuid, _>("event_id")?.into(),
        user_id: row.try_get::<uuid::Uuid, _>("user_id")?.into(),
        status: parse_column(row, "status")?,
        note: row.try_get("note")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(super) fn map_row_to_audit_log(row: &PgRow) -> Result<AuditLog, AppError> {
    Ok(AuditLog {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        tenant_id: row.try_get::<Option<uuid::Uuid>, _>("tenant_id")?.map(Into::into),
        actor_id: row.try_get::<Option<uuid::Uuid>, _>("actor_id")?.map(Into::into),
        action: row.try_get("action")?,
        entity_type: row.try_get("entity_type")?,
        entity_id: row.try_get("entity_id")?,
        metadata: row.try_get("metadata")?,
        trace_id: row.try_get("trace_id")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Capacity is stored as INTEGER
pub(super) fn capacity_to_db(capacity: u32) -> Result<i32, AppError> {
    i32::try_from(capacity).map_err(|_| AppError::invalid_field("capacity", "Capacity is too large"))
}
