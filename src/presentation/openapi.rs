//! OpenAPI document served next to the Swagger UI.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::application::dto::{
    AddMemberRequest, AuditLogDto, AuthResponse, BookingDto, CreateBookingRequest,
    CreateEventRequest, CreateTenantRequest, EventDto, LoginRequest, MemberDto, PresignRequest,
    PresignResponse, RefreshRequest, RegisterRequest, TenantDto, UpdateEventRequest,
    UpdateProfileRequest, UpdateTenantStatusRequest, UpdateUserStatusRequest, UserDto,
};
use crate::domain::value_objects::{
    BookingStatus, EventStatus, MembershipRole, TenantStatus, UserRole,
};
use crate::infrastructure::auth::TokenPair;
use crate::infrastructure::storage::UploadPurpose;
use crate::presentation::handlers::{admin, auth, events, health, media, organizer, users};
use crate::presentation::middleware::error::{ErrorBody, ErrorDetail};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "uae-trails-api",
        version = "v1",
        description = "Multi-tenant events and bookings for UAE Trails"
    ),
    paths(
        health::health,
        health::ready,
        auth::register,
        auth::login,
        auth::refresh,
        auth::me,
        admin::list_tenants,
        admin::create_tenant,
        admin::update_tenant_status,
        admin::add_tenant_member,
        admin::list_users,
        admin::update_user_status,
        admin::list_audit_logs,
        organizer::list_events,
        organizer::create_event,
        organizer::get_event,
        organizer::update_event,
        organizer::publish_event,
        organizer::cancel_event,
        organizer::list_event_bookings,
        organizer::approve_booking,
        organizer::reject_booking,
        organizer::list_members,
        organizer::add_member,
        media::presign_upload,
        events::list_events,
        events::get_event,
        events::create_booking,
        users::my_bookings,
        users::update_profile,
        users::cancel_booking
    ),
    components(schemas(
        ErrorBody,
        ErrorDetail,
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        AuthResponse,
        TokenPair,
        UserDto,
        UserRole,
        UpdateProfileRequest,
        UpdateUserStatusRequest,
        TenantDto,
        TenantStatus,
        CreateTenantRequest,
        UpdateTenantStatusRequest,
        MemberDto,
        MembershipRole,
        AddMemberRequest,
        EventDto,
        EventStatus,
        CreateEventRequest,
        UpdateEventRequest,
        BookingDto,
        BookingStatus,
        CreateBookingRequest,
        PresignRequest,
        PresignResponse,
        UploadPurpose,
        AuditLogDto
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "admin", description = "Platform administration"),
        (name = "organizer", description = "Tenant-scoped event management"),
        (name = "media", description = "Presigned uploads"),
        (name = "events", description = "Public event catalogue and booking"),
        (name = "users", description = "The caller's own account and bookings")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by `security(("bearer" = []))`
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/v1/health",
            "/api/v1/auth/login",
            "/api/v1/admin/tenants",
            "/api/v1/organizer/events/{id}/publish",
            "/api/v1/media/presign",
            "/api/v1/events/{id}/bookings",
            "/api/v1/users/me/bookings/{id}/cancel",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();

        assert!(components.security_schemes.contains_key("bearer"));
    }
}
