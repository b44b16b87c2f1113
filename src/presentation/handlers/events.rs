use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::{BookingDto, CreateBookingRequest, EventDto, PageQuery, Validate};
use crate::application::use_cases::{
    CreateBookingUseCase, GetPublishedEventUseCase, ListPublishedEventsUseCase,
};
use crate::domain::entities::EventId;
use crate::presentation::middleware::{AppError, AuthUser, ErrorBody, TraceId};
use crate::presentation::state::AppState;

/// Public listing of upcoming published events, soonest first
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "events",
    params(PageQuery),
    responses((status = 200, description = "Upcoming events", body = [EventDto]))
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<EventDto>>, AppError> {
    Ok(Json(ListPublishedEventsUseCase::new(state.events).execute(page.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "events",
    params(("id" = uuid::Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Published event", body = EventDto),
        (status = 404, description = "Unknown or unpublished event", body = ErrorBody),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventDto>, AppError> {
    Ok(Json(GetPublishedEventUseCase::new(state.events).execute(event_id).await?))
}

/// Book a place on a published event
///
/// Events without approval are confirmed immediately after a capacity check; others start
/// as `PENDING` until an organizer decides. The body is optional.
///
/// # Errors
/// Returns 409 `ALREADY_BOOKED`, `EVENT_FULL` or `EVENT_STARTED`, and 404 for events that are
/// not open for booking
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/bookings",
    tag = "events",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Event id")),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingDto),
        (status = 404, description = "Event not open for booking", body = ErrorBody),
        (status = 409, description = "Already booked, full, or started", body = ErrorBody),
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    trace_id: TraceId,
    Path(event_id): Path<EventId>,
    body: Bytes,
) -> Result<(StatusCode, Json<BookingDto>), AppError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateBookingRequest::default()
    } else {
        serde_json::from_slice::<CreateBookingRequest>(&body)?
    };
    request.validate()?;

    let use_case = CreateBookingUseCase::new(state.events, state.bookings, state.audit);
    let booking = use_case.execute(user.id, event_id, request, Some(trace_id.as_str())).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
