use chrono::{DateTime, Utc};

use crate::domain::entities::{EventId, TenantId, UserId};
use crate::domain::value_objects::EventStatus;

/// A bookable trail event owned by a tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub tenant_id: TenantId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Maximum number of approved participants
    pub capacity: u32,
    /// When false, bookings are approved immediately if a place is free
    pub requires_approval: bool,
    pub status: EventStatus,
    /// Object storage key of the cover image, set through a presigned upload
    pub cover_image_key: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a draft event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: u32,
    pub requires_approval: bool,
    pub cover_image_key: Option<String>,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<u32>,
    pub requires_approval: Option<bool>,
    pub cover_image_key: Option<String>,
}

impl Event {
    /// Create a draft event inside a tenant
    #[must_use]
    pub fn draft(tenant_id: TenantId, created_by: UserId, new_event: NewEvent) -> Self {
        let now = Utc::now();
        Self {
            id: EventId::new(),
            tenant_id,
            title: new_event.title,
            description: new_event.description,
            location: new_event.location,
            starts_at: new_event.starts_at,
            ends_at: new_event.ends_at,
            capacity: new_event.capacity,
            requires_approval: new_event.requires_approval,
            status: EventStatus::Draft,
            cover_image_key: new_event.cover_image_key,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update and bump `updated_at`
    pub fn apply(&mut self, changes: EventChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(location) = changes.location {
            self.location = location;
        }
        if let Some(starts_at) = changes.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(ends_at) = changes.ends_at {
            self.ends_at = ends_at;
        }
        if let Some(capacity) = changes.capacity {
            self.capacity = capacity;
        }
        if let Some(requires_approval) = changes.requires_approval {
            self.requires_approval = requires_approval;
        }
        if let Some(key) = changes.cover_image_key {
            self.cover_image_key = Some(key);
        }
        self.updated_at = Utc::now();
    }
}
