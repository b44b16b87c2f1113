use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FieldErrors, Validate};
use crate::domain::entities::{Booking, BookingId, EventId, UserId};
use crate::domain::value_objects::BookingStatus;
use crate::presentation::middleware::error::AppError;

pub const MAX_NOTE_LEN: usize = 500;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Message for the organizer
    pub note: Option<String>,
}

impl Validate for CreateBookingRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if self.note.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTE_LEN) {
            errors.add("note", format!("Must be at most {MAX_NOTE_LEN} characters"));
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: BookingId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: BookingStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            event_id: booking.event_id,
            user_id: booking.user_id,
            status: booking.status,
            note: booking.note,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}
