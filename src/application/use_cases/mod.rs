mod audit_logs;
mod auth;
mod bookings;
mod events;
mod media;
mod tenants;
mod users;

pub use audit_logs::ListAuditLogsUseCase;
pub use auth::{LoginUseCase, RefreshTokenUseCase, RegisterUseCase};
pub use bookings::{
    BookingDecision, CancelBookingUseCase, CreateBookingUseCase, DecideBookingUseCase,
    ListEventBookingsUseCase, ListMyBookingsUseCase,
};
pub use events::{
    CreateEventUseCase, EventTransition, GetPublishedEventUseCase, GetTenantEventUseCase,
    ListPublishedEventsUseCase, ListTenantEventsUseCase, TransitionEventUseCase,
    UpdateEventUseCase,
};
pub use media::PresignUploadUseCase;
pub use tenants::{
    AddMemberUseCase, CreateTenantUseCase, ListMembersUseCase, ListTenantsUseCase,
    UpdateTenantStatusUseCase,
};
pub use users::{
    GetProfileUseCase, ListUsersUseCase, UpdateProfileUseCase, UpdateUserStatusUseCase,
};
