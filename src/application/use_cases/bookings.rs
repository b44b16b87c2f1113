use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::events::load_tenant_event;
use crate::{
    application::{
        audit::{AuditEntry, AuditLogger},
        dto::{BookingDto, CreateBookingRequest},
    },
    domain::{
        entities::{Booking, BookingId, EventId, TenantId, UserId},
        repositories::{BookingRepository, EventRepository},
        services::ensure_capacity,
        value_objects::{BookingStatus, EventStatus},
    },
    presentation::middleware::error::AppError,
};

fn booking_not_found(id: BookingId) -> AppError {
    AppError::NotFound { resource: format!("booking {id}") }
}

fn already_booked() -> AppError {
    AppError::Conflict {
        code: "ALREADY_BOOKED",
        message: "You already have a booking for this event".to_string(),
    }
}

fn invalid_booking_status(status: BookingStatus) -> AppError {
    AppError::Conflict {
        code: "INVALID_BOOKING_STATUS",
        message: format!("Booking is already {}", status.as_str().to_lowercase()),
    }
}

/// Use case for a participant booking a place on a published event
pub struct CreateBookingUseCase {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
    audit: AuditLogger,
}

impl CreateBookingUseCase {
    pub fn new(
        events: Arc<dyn EventRepository>,
        bookings: Arc<dyn BookingRepository>,
        audit: AuditLogger,
    ) -> Self {
        Self { events, bookings, audit }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        event_id: EventId,
        request: CreateBookingRequest,
        trace_id: Option<&str>,
    ) -> Result<BookingDto, AppError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .filter(|event| event.status.is_bookable())
            .ok_or_else(|| AppError::NotFound { resource: format!("event {event_id}") })?;

        if event.starts_at <= Utc::now() {
            return Err(AppError::Conflict {
                code: "EVENT_STARTED",
                message: "Bookings close when the event starts".to_string(),
            });
        }

        let existing = self.bookings.find_for_user(event_id, user_id).await?;
        if let Some(existing) = &existing {
            if existing.status != BookingStatus::Cancelled {
                return Err(already_booked());
            }
        }

        let status = if event.requires_approval {
            BookingStatus::Pending
        } else {
            let approved = self.bookings.count_approved(event_id).await?;
            ensure_capacity(approved, event.capacity)?;
            BookingStatus::Approved
        };

        // A cancelled booking is reopened in place; one row per event and user.
        // Losing a race against a concurrent request for the same user is a duplicate.
        let booking = match existing {
            Some(cancelled) => self
                .bookings
                .reopen(cancelled.id, status, request.note)
                .await?
                .ok_or_else(already_booked)?,
            None => {
                let booking = Booking::new(event_id, user_id, status, request.note);
                self.bookings.create(&booking).await.map_err(|e| {
                    if e.is_unique_violation() { already_booked() } else { e }
                })?;
                booking
            }
        };

        info!(booking_id = %booking.id, event_id = %event_id, status = %booking.status, "Booking created");
        self.audit
            .record(
                AuditEntry::new("booking.create", "booking")
                    .entity(booking.id)
                    .tenant(event.tenant_id)
                    .actor(user_id)
                    .trace(trace_id)
                    .metadata(json!({ "eventId": event_id, "status": booking.status })),
            )
            .await;

        Ok(booking.into())
    }
}

/// Organizer decision on a pending booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingDecision {
    Approve,
    Reject,
}

/// Use case for approving or rejecting a pending booking
pub struct DecideBookingUseCase {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
    audit: AuditLogger,
}

impl DecideBookingUseCase {
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
        booking_id: BookingId,
        decision: BookingDecision,
        trace_id: Option<&str>,
    ) -> Result<BookingDto, AppError> {
        let booking =
            self.bookings.find_by_id(booking_id).await?.ok_or_else(|| booking_not_found(booking_id))?;
        let event = load_tenant_event(self.events.as_ref(), tenant_id, booking.event_id)
            .await
            .map_err(|_| booking_not_found(booking_id))?;

        if booking.status != BookingStatus::Pending {
            return Err(invalid_booking_status(booking.status));
        }

        let status = match decision {
            BookingDecision::Approve => {
                if event.status != EventStatus::Published {
                    return Err(AppError::Conflict {
                        code: "EVENT_NOT_BOOKABLE",
                        message: "Only bookings of published events can be approved".to_string(),
                    });
                }
                let approved = self.bookings.count_approved(event.id).await?;
                ensure_capacity(approved, event.capacity)?;
                BookingStatus::Approved
            }
            BookingDecision::Reject => BookingStatus::Rejected,
        };

        let booking = self
            .bookings
            .update_status(booking_id, status)
            .await?
            .ok_or_else(|| booking_not_found(booking_id))?;

        info!(booking_id = %booking.id, status = %booking.status, "Booking decided");
        self.audit
            .record(
                AuditEntry::new(
                    match decision {
                        BookingDecision::Approve => "booking.approve",
                        BookingDecision::Reject => "booking.reject",
                    },
                    "booking",
                )
                .entity(booking.id)
                .tenant(tenant_id)
                .actor(actor)
                .trace(trace_id)
                .metadata(json!({ "eventId": event.id })),
            )
            .await;

        Ok(booking.into())
    }
}

/// Use case for a participant withdrawing their own booking
pub struct CancelBookingUseCase {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
    audit: AuditLogger,
}

impl CancelBookingUseCase {
    pub fn new(
        events: Arc<dyn EventRepository>,
        bookings: Arc<dyn BookingRepository>,
        audit: AuditLogger,
    ) -> Self {
        Self { events, bookings, audit }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        booking_id: BookingId,
        trace_id: Option<&str>,
    ) -> Result<BookingDto, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .filter(|booking| booking.user_id == user_id)
            .ok_or_else(|| booking_not_found(booking_id))?;

        if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Approved) {
            return Err(invalid_booking_status(booking.status));
        }

        let booking = self
            .bookings
            .update_status(booking_id, BookingStatus::Cancelled)
            .await?
            .ok_or_else(|| booking_not_found(booking_id))?;

        let tenant_id = self.events.find_by_id(booking.event_id).await?.map(|event| event.tenant_id);
        let mut entry = AuditEntry::new("booking.cancel", "booking")
            .entity(booking.id)
            .actor(user_id)
            .trace(trace_id);
        if let Some(tenant_id) = tenant_id {
            entry = entry.tenant(tenant_id);
        }
        self.audit.record(entry).await;

        Ok(booking.into())
    }
}

/// Use case for an organizer's view of an event's bookings
pub struct ListEventBookingsUseCase {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl ListEventBookingsUseCase {
    pub fn new(events: Arc<dyn EventRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { events, bookings }
    }

    pub async fn execute(
        &self,
        tenant_id: TenantId,
        event_id: EventId,
    ) -> Result<Vec<BookingDto>, AppError> {
        let event = load_tenant_event(self.events.as_ref(), tenant_id, event_id).await?;
        Ok(self.bookings.list_by_event(event.id).await?.into_iter().map(BookingDto::from).collect())
    }
}

/// Use case for a participant's own bookings
pub struct ListMyBookingsUseCase {
    bookings: Arc<dyn BookingRepository>,
}

impl ListMyBookingsUseCase {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<Vec<BookingDto>, AppError> {
        Ok(self.bookings.list_by_user(user_id).await?.into_iter().map(BookingDto::from).collect())
    }
}
