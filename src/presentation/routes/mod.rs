use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::value_objects::{MembershipRole, UserRole};
use crate::presentation::handlers::{admin, auth, events, health, media, organizer, users};
use crate::presentation::middleware::{
    require_auth, require_membership_roles, require_roles, tenant_context,
};
use crate::presentation::openapi::ApiDoc;
use crate::presentation::state::AppState;

/// Tenant roles allowed to change tenant data
const MANAGERS: &[MembershipRole] = &[MembershipRole::Owner, MembershipRole::Manager];

/// Create all application routes with application state
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(&state))
        // Probes are also served unprefixed for orchestrators
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Everything mounted under `/api/v1`
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/auth", auth_routes(state))
        .nest("/admin", admin_routes(state))
        .nest("/organizer", organizer_routes(state))
        .nest("/media", media_routes(state))
        .nest("/events", event_routes(state))
        .nest("/users", user_routes(state))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let authenticated = Router::new()
        .route("/me", get(auth::me))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .merge(authenticated)
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/tenants", get(admin::list_tenants).post(admin::create_tenant))
        .route("/tenants/{id}/status", patch(admin::update_tenant_status))
        .route("/tenants/{id}/members", post(admin::add_tenant_member))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/status", patch(admin::update_user_status))
        .route("/audit-logs", get(admin::list_audit_logs))
        .route_layer(from_fn(require_roles(&[UserRole::Admin])))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// Reads and booking decisions are open to every member; the rest needs a manager
fn organizer_routes(state: &AppState) -> Router<AppState> {
    let managers = Router::new()
        .route("/events", post(organizer::create_event))
        .route("/events/{id}", patch(organizer::update_event))
        .route("/events/{id}/publish", post(organizer::publish_event))
        .route("/events/{id}/cancel", post(organizer::cancel_event))
        .route("/members", post(organizer::add_member))
        .route_layer(from_fn(require_membership_roles(MANAGERS)));

    Router::new()
        .route("/events", get(organizer::list_events))
        .route("/events/{id}", get(organizer::get_event))
        .route("/events/{id}/bookings", get(organizer::list_event_bookings))
        .route("/bookings/{id}/approve", post(organizer::approve_booking))
        .route("/bookings/{id}/reject", post(organizer::reject_booking))
        .route("/members", get(organizer::list_members))
        .merge(managers)
        .route_layer(from_fn_with_state(state.clone(), tenant_context))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn media_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/presign", post(media::presign_upload))
        .route_layer(from_fn(require_membership_roles(MANAGERS)))
        .route_layer(from_fn_with_state(state.clone(), tenant_context))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn event_routes(state: &AppState) -> Router<AppState> {
    let authenticated = Router::new()
        .route("/{id}/bookings", post(events::create_booking))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(events::list_events))
        .route("/{id}", get(events::get_event))
        .merge(authenticated)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", patch(users::update_profile))
        .route("/me/bookings", get(users::my_bookings))
        .route("/me/bookings/{id}/cancel", post(users::cancel_booking))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;
    use axum::{body::Body, http::Request, http::StatusCode};
    use rstest::rstest;
    use tower::ServiceExt;

    #[rstest]
    #[case("GET", "/api/v1/health", StatusCode::OK)]
    #[case("GET", "/health", StatusCode::OK)]
    #[case("GET", "/api/v1/ready", StatusCode::OK)]
    #[case("GET", "/api/v1/events", StatusCode::OK)]
    #[case("GET", "/api/v1/auth/me", StatusCode::UNAUTHORIZED)]
    #[case("GET", "/api/v1/admin/tenants", StatusCode::UNAUTHORIZED)]
    #[case("GET", "/api/v1/organizer/events", StatusCode::UNAUTHORIZED)]
    #[case("POST", "/api/v1/media/presign", StatusCode::UNAUTHORIZED)]
    #[case("GET", "/api/v1/users/me/bookings", StatusCode::UNAUTHORIZED)]
    #[case("GET", "/api/docs/openapi.json", StatusCode::OK)]
    #[tokio::test]
    async fn test_route_table(
        #[case] method: &str,
        #[case] uri: &str,
        #[case] expected: StatusCode,
    ) {
        let ctx = TestContext::new();
        let app = create_routes(ctx.state.clone());

        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), expected);
    }

    #[tokio::test]
    async fn test_participant_cannot_reach_admin_routes() {
        let ctx = TestContext::new();
        let user = ctx.user("hiker@trails.ae", UserRole::Participant).await;
        let token = ctx.access_token(&user);

        let response = create_routes(ctx.state.clone())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/admin/users")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
