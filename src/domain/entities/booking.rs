use chrono::{DateTime, Utc};

use crate::domain::entities::{BookingId, EventId, UserId};
use crate::domain::value_objects::BookingStatus;

/// A participant's place request on an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: BookingStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    #[must_use]
    pub fn new(event_id: EventId, user_id: UserId, status: BookingStatus, note: Option<String>) -> Self {
        let now = Utc::now();
        Self { id: BookingId::new(), event_id, user_id, status, note, created_at: now, updated_at: now }
    }
}
