use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        audit::{AuditEntry, AuditLogger},
        dto::{CreateEventRequest, EventDto, UpdateEventRequest},
    },
    domain::{
        entities::{Event, EventChanges, EventId, TenantId, UserId},
        repositories::{BookingRepository, EventRepository, Page},
        value_objects::EventStatus,
    },
    presentation::middleware::error::AppError,
};

fn event_not_found(id: EventId) -> AppError {
    AppError::NotFound { resource: format!("event {id}") }
}

/// Load an event, hiding events of other tenants behind a 404
pub(super) async fn load_tenant_event(
    events: &dyn EventRepository,
    tenant_id: TenantId,
    event_id: EventId,
) -> Result<Event, AppError> {
    events
        .find_by_id(event_id)
        .await?
        .filter(|event| event.tenant_id == tenant_id)
        .ok_or_else(|| event_not_found(event_id))
}

/// Cover images must come from the tenant's own upload prefix
fn check_cover_key(tenant_id: TenantId, key: Option<&str>) -> Result<(), AppError> {
    match key {
        Some(key) if !key.starts_with(&format!("tenants/{tenant_id}/")) => Err(
            AppError::invalid_field("coverImageKey", "Must be an upload key of this tenant"),
        ),
        _ => Ok(()),
    }
}

/// Use case for creating a draft event
pub struct CreateEventUseCase {
    events: Arc<dyn EventRepository>,
    audit: AuditLogger,
}

impl CreateEventUseCase {
    pub fn new(events: Arc<dyn EventRepository>, audit: AuditLogger) -> Self {
        Self { events, audit }
    }

    pub async fn execute(
        &self,
        actor: UserId,
        tenant_id: TenantId,
        request: CreateEventRequest,
        trace_id: Option<&str>,
    ) -> Result<EventDto, AppError> {
        check_cover_key(tenant_id, request.cover_image_key.as_deref())?;

        let event = Event::draft(tenant_id, actor, request.into());
        self.events.create(&event).await?;

        info!(event_id = %event.id, tenant_id = %tenant_id, "Event created");
        self.audit
            .record(
                AuditEntry::new("event.create", "event")
                    .entity(event.id)
                    .tenant(tenant_id)
                    .actor(actor)
                    .trace(trace_id)
                    .metadata(json!({ "title": event.title, "capacity": event.capacity })),
            )
            .await;

        Ok(event.into())
    }
}

/// Use case for editing an event that is not cancelled
pub struct UpdateEventUseCase {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
    audit: AuditLogger,
}

impl UpdateEventUseCase {
    pub fn new(
        events: Arc<dyn EventRepository>,
        bookings: Arc<dyn BookingRepository>,
        audit: AuditLogger,
    ) -> Self {
        Self { events, bookings, audit }
    }

    pub async fn execute(
        &self,
        actor: UserId,
        tenant_id: TenantId,
        event_id: EventId,
        request: UpdateEventRequest,
        trace_id: Option<&str>,
    ) -> Result<EventDto, AppError> {
        let mut event = load_tenant_event(self.events.as_ref(), tenant_id, event_id).await?;
        if event.status == EventStatus::Cancelled {
            return Err(AppError::Conflict {
                code: "EVENT_CANCELLED",
                message: "Cancelled events cannot be edited".to_string(),
            });
        }
        check_cover_key(tenant_id, request.cover_image_key.as_deref())?;

        let changes = EventChanges::from(request);
        if let Some(capacity) = changes.capacity {
            let approved = self.bookings.count_approved(event_id).await?;
            if capacity < approved {
                return Err(AppError::Conflict {
                    code: "CAPACITY_BELOW_APPROVED",
                    message: format!("{approved} bookings are already approved"),
                });
            }
        }

        event.apply(changes);
        if event.ends_at <= event.starts_at {
            return Err(AppError::invalid_field("endsAt", "Must be after startsAt"));
        }
        self.events.update(&event).await?;

        self.audit
            .record(
                AuditEntry::new("event.update", "event")
                    .entity(event.id)
                    .tenant(tenant_id)
                    .actor(actor)
                    .trace(trace_id),
            )
            .await;

        Ok(event.into())
    }
}

/// Use case for reading one of the tenant's events
pub struct GetTenantEventUseCase {
    events: Arc<dyn EventRepository>,
}

impl GetTenantEventUseCase {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn execute(&self, tenant_id: TenantId, event_id: EventId) -> Result<EventDto, AppError> {
        Ok(load_tenant_event(self.events.as_ref(), tenant_id, event_id).await?.into())
    }
}

/// Use case for listing the tenant's events in every status
pub struct ListTenantEventsUseCase {
    events: Arc<dyn EventRepository>,
}

impl ListTenantEventsUseCase {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn execute(&self, tenant_id: TenantId, page: Page) -> Result<Vec<EventDto>, AppError> {
        Ok(self.events.list_by_tenant(tenant_id, page).await?.into_iter().map(EventDto::from).collect())
    }
}

/// Lifecycle moves an organizer can make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTransition {
    Publish,
    Cancel,
}

impl EventTransition {
    fn target(self, from: EventStatus) -> Option<EventStatus> {
        match (self, from) {
            (Self::Publish, EventStatus::Draft) => Some(EventStatus::Published),
            (Self::Cancel, EventStatus::Draft | EventStatus::Published) => Some(EventStatus::Cancelled),
            _ => None,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Cancel => "cancel",
        }
    }

    fn action(self) -> &'static str {
        match self {
            Self::Publish => "event.publish",
            Self::Cancel => "event.cancel",
        }
    }
}

/// Use case for publishing or cancelling an event
pub struct TransitionEventUseCase {
    events: Arc<dyn EventRepository>,
    audit: AuditLogger,
}

impl TransitionEventUseCase {
    pub fn new(events: Arc<dyn EventRepository>, audit: AuditLogger) -> Self {
        Self { events, audit }
    }

    pub async fn execute(
        &self,
        actor: UserId,
        tenant_id: TenantId,
        event_id: EventId,
        transition: EventTransition,
        trace_id: Option<&str>,
    ) -> Result<EventDto, AppError> {
        let mut event = load_tenant_event(self.events.as_ref(), tenant_id, event_id).await?;
        let from = event.status;
        let Some(to) = transition.target(from) else {
            return Err(AppError::Conflict {
                code: "INVALID_EVENT_STATUS",
                message: format!(
                    "Cannot {} an event that is {}",
                    transition.verb(),
                    from.as_str().to_lowercase()
                ),
            });
        };

        event.status = to;
        event.updated_at = Utc::now();
        self.events.update(&event).await?;

        info!(event_id = %event.id, from = %from, to = %to, "Event status changed");
        self.audit
            .record(
                AuditEntry::new(transition.action(), "event")
                    .entity(event.id)
                    .tenant(tenant_id)
                    .actor(actor)
                    .trace(trace_id)
                    .metadata(json!({ "from": from, "to": to })),
            )
            .await;

        Ok(event.into())
    }
}

/// Use case for the public listing of upcoming published events
pub struct ListPublishedEventsUseCase {
    events: Arc<dyn EventRepository>,
}

impl ListPublishedEventsUseCase {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn execute(&self, page: Page) -> Result<Vec<EventDto>, AppError> {
        let events = self.events.list_published(Utc::now(), page).await?;
        Ok(events.into_iter().map(EventDto::from).collect())
    }
}

/// Use case for the public view of one event; drafts and cancelled events are hidden
pub struct GetPublishedEventUseCase {
    events: Arc<dyn EventRepository>,
}

impl GetPublishedEventUseCase {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    pub async fn execute(&self, event_id: EventId) -> Result<EventDto, AppError> {
        self.events
            .find_by_id(event_id)
            .await?
            .filter(|event| event.status == EventStatus::Published)
            .map(EventDto::from)
            .ok_or_else(|| event_not_found(event_id))
    }
}
