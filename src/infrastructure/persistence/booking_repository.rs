use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::rows::{map_row_to_booking, BOOKING_COLUMNS};
use crate::domain::entities::{Booking, BookingId, EventId, UserId};
use crate::domain::repositories::BookingRepository;
use crate::domain::value_objects::BookingStatus;
use crate::presentation::middleware::error::AppError;

/// `PostgreSQL` implementation of `BookingRepository`
#[derive(Clone)]
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<(), AppError> {
        sqlx::query(
            r"
            INSERT INTO bookings (id, event_id, user_id, status, note, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.event_id.as_uuid())
        .bind(booking.user_id.as_uuid())
        .bind(booking.status.as_str())
        .bind(&booking.note)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    async fn find_for_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    async fn list_by_event(&self, event_id: EventId) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE event_id = $1 ORDER BY created_at"
        ))
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_booking).collect()
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_booking).collect()
    }

    async fn count_approved(&self, event_id: EventId) -> Result<u32, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS approved FROM bookings WHERE event_id = $1 AND status = $2",
        )
        .bind(event_id.as_uuid())
        .bind(BookingStatus::Approved.as_str())
        .fetch_one(&self.pool)
        .await?;

        let approved: i64 = row.try_get("approved")?;
        Ok(u32::try_from(approved).unwrap_or(u32::MAX))
    }

    async fn update_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE bookings SET status = $2, updated_at = now() WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    async fn reopen(
        &self,
        id: BookingId,
        status: BookingStatus,
        note: Option<String>,
    ) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query(&format!(
            r"
            UPDATE bookings SET status = $2, note = $3, updated_at = now()
            WHERE id = $1 AND status = $4
            RETURNING {BOOKING_COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(note)
        .bind(BookingStatus::Cancelled.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }
}
