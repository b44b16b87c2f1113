use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FieldErrors, Validate};
use crate::domain::entities::{Event, EventChanges, EventId, NewEvent, TenantId, UserId};
use crate::domain::value_objects::EventStatus;
use crate::presentation::middleware::error::AppError;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_LOCATION_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_CAPACITY: u32 = 100_000;

fn check_capacity(errors: &mut FieldErrors, capacity: u32) {
    errors.check(
        (1..=MAX_CAPACITY).contains(&capacity),
        "capacity",
        format!("Must be between 1 and {MAX_CAPACITY}"),
    );
}

fn check_description(errors: &mut FieldErrors, description: Option<&str>) {
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
        errors.add("description", format!("Must be at most {MAX_DESCRIPTION_LEN} characters"));
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: u32,
    #[serde(default)]
    pub requires_approval: bool,
    /// Object key returned by the media presign endpoint
    pub cover_image_key: Option<String>,
}

impl Validate for CreateEventRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.text("title", &self.title, MAX_TITLE_LEN);
        errors.text("location", &self.location, MAX_LOCATION_LEN);
        check_description(&mut errors, self.description.as_deref());
        check_capacity(&mut errors, self.capacity);
        errors.check(self.ends_at > self.starts_at, "endsAt", "Must be after startsAt");
        errors.finish()
    }
}

impl From<CreateEventRequest> for NewEvent {
    fn from(request: CreateEventRequest) -> Self {
        Self {
            title: request.title.trim().to_string(),
            description: request.description.unwrap_or_default(),
            location: request.location.trim().to_string(),
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            capacity: request.capacity,
            requires_approval: request.requires_approval,
            cover_image_key: request.cover_image_key,
        }
    }
}

/// Partial update; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<u32>,
    pub requires_approval: Option<bool>,
    pub cover_image_key: Option<String>,
}

impl Validate for UpdateEventRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.optional_text("title", self.title.as_deref(), MAX_TITLE_LEN);
        errors.optional_text("location", self.location.as_deref(), MAX_LOCATION_LEN);
        check_description(&mut errors, self.description.as_deref());
        if let Some(capacity) = self.capacity {
            check_capacity(&mut errors, capacity);
        }
        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at) {
            errors.check(ends_at > starts_at, "endsAt", "Must be after startsAt");
        }
        errors.finish()
    }
}

impl From<UpdateEventRequest> for EventChanges {
    fn from(request: UpdateEventRequest) -> Self {
        Self {
            title: request.title.map(|t| t.trim().to_string()),
            description: request.description,
            location: request.location.map(|l| l.trim().to_string()),
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            capacity: request.capacity,
            requires_approval: request.requires_approval,
            cover_image_key: request.cover_image_key,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: EventId,
    pub tenant_id: TenantId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: u32,
    pub requires_approval: bool,
    pub status: EventStatus,
    pub cover_image_key: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            tenant_id: event.tenant_id,
            title: event.title,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            capacity: event.capacity,
            requires_approval: event.requires_approval,
            status: event.status,
            cover_image_key: event.cover_image_key,
            created_by: event.created_by,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}
