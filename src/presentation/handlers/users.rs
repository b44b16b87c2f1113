use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::{BookingDto, UpdateProfileRequest, UserDto};
use crate::application::use_cases::{
    CancelBookingUseCase, ListMyBookingsUseCase, UpdateProfileUseCase,
};
use crate::domain::entities::BookingId;
use crate::presentation::middleware::{AppError, AuthUser, ErrorBody, TraceId, ValidatedJson};
use crate::presentation::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/users/me/bookings",
    tag = "users",
    security(("bearer" = [])),
    responses((status = 200, description = "The caller's bookings", body = [BookingDto]))
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<BookingDto>>, AppError> {
    Ok(Json(ListMyBookingsUseCase::new(state.bookings).execute(user.id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Invalid name", body = ErrorBody),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserDto>, AppError> {
    Ok(Json(UpdateProfileUseCase::new(state.users).execute(user.id, request).await?))
}

/// Cancel one of the caller's own bookings
///
/// # Errors
/// Returns 404 for bookings of other users and 409 when the booking is already final
#[utoipa::path(
    post,
    path = "/api/v1/users/me/bookings/{id}/cancel",
    tag = "users",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingDto),
        (status = 404, description = "No such booking", body = ErrorBody),
        (status = 409, description = "Booking already rejected or cancelled", body = ErrorBody),
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthUser,
    trace_id: TraceId,
    Path(booking_id): Path<BookingId>,
) -> Result<Json<BookingDto>, AppError> {
    let use_case = CancelBookingUseCase::new(state.events, state.bookings, state.audit);
    Ok(Json(use_case.execute(user.id, booking_id, Some(trace_id.as_str())).await?))
}
