//! Tenant-scoped event management. Every handler here runs behind the tenant context
//! middleware, so [`TenantContext`] always names an active tenant the caller belongs to.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::{
    AddMemberRequest, BookingDto, CreateEventRequest, EventDto, MemberDto, PageQuery,
    UpdateEventRequest,
};
use crate::application::use_cases::{
    AddMemberUseCase, BookingDecision, CreateEventUseCase, DecideBookingUseCase, EventTransition,
    GetTenantEventUseCase, ListEventBookingsUseCase, ListMembersUseCase, ListTenantEventsUseCase,
    TransitionEventUseCase, UpdateEventUseCase,
};
use crate::domain::entities::{BookingId, EventId};
use crate::presentation::middleware::{
    AppError, AuthUser, ErrorBody, TenantContext, TraceId, ValidatedJson,
};
use crate::presentation::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/organizer/events",
    tag = "organizer",
    security(("bearer" = [])),
    params(("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on"), PageQuery),
    responses(
        (status = 200, description = "Events of the tenant in every status", body = [EventDto]),
        (status = 403, description = "Not a member or tenant inactive", body = ErrorBody),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<EventDto>>, AppError> {
    let events =
        ListTenantEventsUseCase::new(state.events).execute(tenant.tenant_id(), page.into()).await?;
    Ok(Json(events))
}

/// Create a draft event
///
/// # Errors
/// Returns 400 for invalid fields or a cover image key outside the tenant's upload prefix
#[utoipa::path(
    post,
    path = "/api/v1/organizer/events",
    tag = "organizer",
    security(("bearer" = [])),
    params(("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on")),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Draft created", body = EventDto),
        (status = 400, description = "Invalid input", body = ErrorBody),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    tenant: TenantContext,
    trace_id: TraceId,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDto>), AppError> {
    let use_case = CreateEventUseCase::new(state.events, state.audit);
    let event =
        use_case.execute(user.id, tenant.tenant_id(), request, Some(trace_id.as_str())).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    get,
    path = "/api/v1/organizer/events/{id}",
    tag = "organizer",
    security(("bearer" = [])),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on"),
        ("id" = uuid::Uuid, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Event", body = EventDto),
        (status = 404, description = "No such event in this tenant", body = ErrorBody),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventDto>, AppError> {
    Ok(Json(GetTenantEventUseCase::new(state.events).execute(tenant.tenant_id(), event_id).await?))
}

/// Partially update an event
///
/// # Errors
/// Returns 409 `EVENT_CANCELLED` for cancelled events and 409 `CAPACITY_BELOW_APPROVED` when
/// the new capacity is below the approved booking count
#[utoipa::path(
    patch,
    path = "/api/v1/organizer/events/{id}",
    tag = "organizer",
    security(("bearer" = [])),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on"),
        ("id" = uuid::Uuid, Path, description = "Event id"),
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventDto),
        (status = 404, description = "No such event in this tenant", body = ErrorBody),
        (status = 409, description = "Event cancelled or capacity too low", body = ErrorBody),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    tenant: TenantContext,
    trace_id: TraceId,
    Path(event_id): Path<EventId>,
    ValidatedJson(request): ValidatedJson<UpdateEventRequest>,
) -> Result<Json<EventDto>, AppError> {
    let use_case = UpdateEventUseCase::new(state.events, state.bookings, state.audit);
    let event = use_case
        .execute(user.id, tenant.tenant_id(), event_id, request, Some(trace_id.as_str()))
        .await?;
    Ok(Json(event))
}

async fn transition_event(
    state: AppState,
    user: &AuthUser,
    tenant: &TenantContext,
    trace_id: &TraceId,
    event_id: EventId,
    transition: EventTransition,
) -> Result<Json<EventDto>, AppError> {
    let use_case = TransitionEventUseCase::new(state.events, state.audit);
    let event = use_case
        .execute(user.id, tenant.tenant_id(), event_id, transition, Some(trace_id.as_str()))
        .await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/api/v1/organizer/events/{id}/publish",
    tag = "organizer",
    security(("bearer" = [])),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on"),
        ("id" = uuid::Uuid, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Event published", body = EventDto),
        (status = 409, description = "Only drafts can be published", body = ErrorBody),
    )
)]
pub async fn publish_event(
    State(state): State<AppState>,
    user: AuthUser,
    tenant: TenantContext,
    trace_id: TraceId,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventDto>, AppError> {
    transition_event(state, &user, &tenant, &trace_id, event_id, EventTransition::Publish).await
}

#[utoipa::path(
    post,
    path = "/api/v1/organizer/events/{id}/cancel",
    tag = "organizer",
    security(("bearer" = [])),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on"),
        ("id" = uuid::Uuid, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Event cancelled", body = EventDto),
        (status = 409, description = "Event already cancelled", body = ErrorBody),
    )
)]
pub async fn cancel_event(
    State(state): State<AppState>,
    user: AuthUser,
    tenant: TenantContext,
    trace_id: TraceId,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventDto>, AppError> {
    transition_event(state, &user, &tenant, &trace_id, event_id, EventTransition::Cancel).await
}

#[utoipa::path(
    get,
    path = "/api/v1/organizer/events/{id}/bookings",
    tag = "organizer",
    security(("bearer" = [])),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on"),
        ("id" = uuid::Uuid, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Bookings of the event", body = [BookingDto]),
        (status = 404, description = "No such event in this tenant", body = ErrorBody),
    )
)]
pub async fn list_event_bookings(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<BookingDto>>, AppError> {
    let use_case = ListEventBookingsUseCase::new(state.events, state.bookings);
    Ok(Json(use_case.execute(tenant.tenant_id(), event_id).await?))
}

async fn decide_booking(
    state: AppState,
    user: &AuthUser,
    tenant: &TenantContext,
    trace_id: &TraceId,
    booking_id: BookingId,
    decision: BookingDecision,
) -> Result<Json<BookingDto>, AppError> {
    let use_case = DecideBookingUseCase::new(state.events, state.bookings, state.audit);
    let booking = use_case
        .execute(user.id, tenant.tenant_id(), booking_id, decision, Some(trace_id.as_str()))
        .await?;
    Ok(Json(booking))
}

/// Approve a pending booking after a capacity check
///
/// # Errors
/// Returns 409 `EVENT_FULL` when approving would exceed the event's capacity
#[utoipa::path(
    post,
    path = "/api/v1/organizer/bookings/{id}/approve",
    tag = "organizer",
    security(("bearer" = [])),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on"),
        ("id" = uuid::Uuid, Path, description = "Booking id"),
    ),
    responses(
        (status = 200, description = "Booking approved", body = BookingDto),
        (status = 409, description = "Event full or booking not pending", body = ErrorBody),
    )
)]
pub async fn approve_booking(
    State(state): State<AppState>,
    user: AuthUser,
    tenant: TenantContext,
    trace_id: TraceId,
    Path(booking_id): Path<BookingId>,
) -> Result<Json<BookingDto>, AppError> {
    decide_booking(state, &user, &tenant, &trace_id, booking_id, BookingDecision::Approve).await
}

#[utoipa::path(
    post,
    path = "/api/v1/organizer/bookings/{id}/reject",
    tag = "organizer",
    security(("bearer" = [])),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on"),
        ("id" = uuid::Uuid, Path, description = "Booking id"),
    ),
    responses(
        (status = 200, description = "Booking rejected", body = BookingDto),
        (status = 409, description = "Booking not pending", body = ErrorBody),
    )
)]
pub async fn reject_booking(
    State(state): State<AppState>,
    user: AuthUser,
    tenant: TenantContext,
    trace_id: TraceId,
    Path(booking_id): Path<BookingId>,
) -> Result<Json<BookingDto>, AppError> {
    decide_booking(state, &user, &tenant, &trace_id, booking_id, BookingDecision::Reject).await
}

#[utoipa::path(
    get,
    path = "/api/v1/organizer/members",
    tag = "organizer",
    security(("bearer" = [])),
    params(("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on")),
    responses((status = 200, description = "Members of the tenant", body = [MemberDto]))
)]
pub async fn list_members(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<Vec<MemberDto>>, AppError> {
    Ok(Json(ListMembersUseCase::new(state.tenants).execute(tenant.tenant_id()).await?))
}

/// Attach a user to the tenant by e-mail, creating an organizer account when a name and
/// password are supplied
#[utoipa::path(
    post,
    path = "/api/v1/organizer/members",
    tag = "organizer",
    security(("bearer" = [])),
    params(("x-tenant-id" = uuid::Uuid, Header, description = "Tenant to operate on")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberDto),
        (status = 403, description = "Caller is not an owner or manager, or touches an owner without being one", body = ErrorBody),
        (status = 404, description = "No account with that e-mail", body = ErrorBody),
        (status = 409, description = "Would demote the last owner", body = ErrorBody),
    )
)]
pub async fn add_member(
    State(state): State<AppState>,
    user: AuthUser,
    tenant: TenantContext,
    trace_id: TraceId,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberDto>), AppError> {
    let use_case = AddMemberUseCase::new(state.tenants, state.users, state.audit);
    let member = use_case
        .execute(user.id, Some(tenant.role), tenant.tenant_id(), request, Some(trace_id.as_str()))
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}
