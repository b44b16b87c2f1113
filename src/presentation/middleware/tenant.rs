use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::{Tenant, TenantId};
use crate::domain::value_objects::MembershipRole;
use crate::presentation::middleware::auth::AuthUser;
use crate::presentation::middleware::error::AppError;
use crate::presentation::state::AppState;

pub const TENANT_HEADER: HeaderName = HeaderName::from_static("x-tenant-id");

/// The tenant a request operates on and the caller's role inside it
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant: Tenant,
    pub role: MembershipRole,
}

impl TenantContext {
    pub fn tenant_id(&self) -> TenantId {
        self.tenant.id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<TenantContext>().cloned().ok_or_else(tenant_required)
    }
}

fn tenant_required() -> AppError {
    AppError::BadRequest {
        code: "TENANT_REQUIRED",
        message: "A valid x-tenant-id header is required".to_string(),
    }
}

fn tenant_id_from_headers(headers: &HeaderMap) -> Result<TenantId, AppError> {
    headers
        .get(&TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(TenantId::from_uuid)
        .ok_or_else(tenant_required)
}

/// Resolve `x-tenant-id` into a [`TenantContext`]
///
/// Must run after [`crate::presentation::middleware::auth::require_auth`]. Platform
/// admins act as owners of any existing tenant.
pub async fn tenant_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request.extensions().get::<AuthUser>().cloned().ok_or_else(|| {
        AppError::Authentication { message: "Authentication required".to_string() }
    })?;
    let tenant_id = tenant_id_from_headers(request.headers())?;

    let access = state
        .tenants
        .find_access(tenant_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound { resource: "tenant".to_string() })?;

    let role = if user.role.is_admin() {
        MembershipRole::Owner
    } else {
        access.membership.map(|m| m.role).ok_or_else(|| AppError::Forbidden {
            code: "TENANT_ACCESS_DENIED",
            message: "You are not a member of this tenant".to_string(),
        })?
    };

    if !access.tenant.status.is_active() {
        return Err(AppError::Forbidden {
            code: "TENANT_INACTIVE",
            message: format!("Tenant is {}", access.tenant.status.as_str().to_lowercase()),
        });
    }

    debug!(tenant_id = %tenant_id, user_id = %user.id, role = %role, "Tenant context resolved");
    request.extensions_mut().insert(TenantContext { tenant: access.tenant, role });
    Ok(next.run(request).await)
}

/// Membership-role authorization; must run after [`tenant_context`]
pub fn require_membership_roles(
    allowed: &'static [MembershipRole],
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
       + Clone {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let context = request.extensions().get::<TenantContext>().ok_or_else(tenant_required)?;

            if !allowed.contains(&context.role) {
                return Err(AppError::Forbidden {
                    code: "FORBIDDEN",
                    message: format!("Tenant role {} may not perform this action", context.role),
                });
            }

            Ok(next.run(request).await)
        })
    }
}
