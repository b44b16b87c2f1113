use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::domain::entities::{User, UserId};
use crate::domain::value_objects::{Email, UserRole};
use crate::presentation::middleware::error::AppError;
use crate::presentation::state::AppState;

/// The authenticated caller, as loaded from the user store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
    /// Current role from the store, not the possibly stale token claim
    pub role: UserRole,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self { id: user.id, email: user.email.clone(), role: user.role }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| AppError::Authentication {
            message: "Authentication required".to_string(),
        })
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Authentication {
            message: "Missing Authorization header".to_string(),
        })?
        .to_str()
        .map_err(|_| AppError::Authentication {
            message: "Invalid Authorization header".to_string(),
        })?;

    let (scheme, token) = value.split_once(' ').ok_or_else(|| AppError::Authentication {
        message: "Authorization header must use the Bearer scheme".to_string(),
    })?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Authentication {
            message: "Authorization header must use the Bearer scheme".to_string(),
        });
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Authentication { message: "Empty bearer token".to_string() });
    }
    Ok(token)
}

/// Verify the access token, load the caller and store [`AuthUser`] in request extensions
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let claims = state.jwt.verify_access_token(token)?;
    let user_id = claims.user_id()?;

    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        AppError::Authentication { message: "Account no longer exists".to_string() }
    })?;
    if !user.is_active {
        return Err(AppError::Forbidden {
            code: "USER_INACTIVE",
            message: "This account has been deactivated".to_string(),
        });
    }

    debug!(user_id = %user.id, role = %user.role, "Request authenticated");
    request.extensions_mut().insert(AuthUser::from(&user));
    Ok(next.run(request).await)
}

/// Role-based authorization middleware on the global user role
///
/// Must run after [`require_auth`].
pub fn require_roles(
    allowed: &'static [UserRole],
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
       + Clone {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let user = request.extensions().get::<AuthUser>().ok_or_else(|| {
                AppError::Authentication { message: "Authentication required".to_string() }
            })?;

            if !allowed.contains(&user.role) {
                return Err(AppError::Forbidden {
                    code: "FORBIDDEN",
                    message: format!("Role {} may not access this resource", user.role),
                });
            }

            Ok(next.run(request).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::{from_fn, from_fn_with_state},
        routing::get,
        Router,
    };
    use rstest::rstest;
    use tower::ServiceExt;

    async fn whoami(user: AuthUser) -> String {
        user.email.to_string()
    }

    fn app(ctx: &TestContext) -> Router {
        let admin_only = Router::new()
            .route("/admin", get(whoami))
            .route_layer(from_fn(require_roles(&[UserRole::Admin])));

        Router::new()
            .route("/me", get(whoami))
            .merge(admin_only)
            .route_layer(from_fn_with_state(ctx.state.clone(), require_auth))
    }

    fn get_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[rstest]
    #[case::missing(None)]
    #[case::wrong_scheme(Some("Basic dXNlcjpwYXNz"))]
    #[case::empty_token(Some("Bearer   "))]
    #[case::garbage(Some("Bearer not-a-jwt"))]
    #[tokio::test]
    async fn test_rejects_bad_credentials(#[case] authorization: Option<&str>) {
        let ctx = TestContext::new();

        let response = app(&ctx).oneshot(get_with_auth("/me", authorization)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let ctx = TestContext::new();
        let user = ctx.user("hiker@trails.ae", UserRole::Participant).await;
        let token = ctx.access_token(&user);

        let response = app(&ctx)
            .oneshot(get_with_auth("/me", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let ctx = TestContext::new();
        let user = ctx.user("hiker@trails.ae", UserRole::Participant).await;
        let refresh = ctx.state.jwt.sign_refresh_token(user.id, user.role).unwrap();

        let response = app(&ctx)
            .oneshot(get_with_auth("/me", Some(&format!("Bearer {refresh}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_inactive_user_is_forbidden() {
        let ctx = TestContext::new();
        let user = ctx.user("gone@trails.ae", UserRole::Participant).await;
        let token = ctx.access_token(&user);
        ctx.state.users.set_active(user.id, false).await.unwrap();

        let response = app(&ctx)
            .oneshot(get_with_auth("/me", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case(UserRole::Admin, StatusCode::OK)]
    #[case(UserRole::Organizer, StatusCode::FORBIDDEN)]
    #[case(UserRole::Participant, StatusCode::FORBIDDEN)]
    #[tokio::test]
    async fn test_require_roles(#[case] role: UserRole, #[case] expected: StatusCode) {
        let ctx = TestContext::new();
        let user = ctx.user("someone@trails.ae", role).await;
        let token = ctx.access_token(&user);

        let response = app(&ctx)
            .oneshot(get_with_auth("/admin", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), expected);
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "bearer abc.def.ghi".parse().unwrap());

        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }
}
