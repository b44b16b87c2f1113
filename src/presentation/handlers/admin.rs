//! Platform administration: tenants, accounts and the audit trail.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::{
    AddMemberRequest, AuditLogDto, AuditLogQuery, CreateTenantRequest, MemberDto, PageQuery,
    TenantDto, UpdateTenantStatusRequest, UpdateUserStatusRequest, UserDto,
};
use crate::application::use_cases::{
    AddMemberUseCase, CreateTenantUseCase, ListAuditLogsUseCase, ListTenantsUseCase,
    ListUsersUseCase, UpdateTenantStatusUseCase, UpdateUserStatusUseCase,
};
use crate::domain::entities::{TenantId, UserId};
use crate::presentation::middleware::{AppError, AuthUser, ErrorBody, TraceId, ValidatedJson};
use crate::presentation::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/admin/tenants",
    tag = "admin",
    security(("bearer" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Tenants, newest first", body = [TenantDto]),
        (status = 403, description = "Not an administrator", body = ErrorBody),
    )
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<TenantDto>>, AppError> {
    Ok(Json(ListTenantsUseCase::new(state.tenants).execute(page.into()).await?))
}

/// Create a tenant, optionally attaching an existing user as its owner
///
/// # Errors
/// Returns 400 for an invalid slug or unknown owner e-mail and `DB_23505` for a taken slug
#[utoipa::path(
    post,
    path = "/api/v1/admin/tenants",
    tag = "admin",
    security(("bearer" = [])),
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created", body = TenantDto),
        (status = 400, description = "Invalid input or duplicate slug", body = ErrorBody),
    )
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    admin: AuthUser,
    trace_id: TraceId,
    ValidatedJson(request): ValidatedJson<CreateTenantRequest>,
) -> Result<(StatusCode, Json<TenantDto>), AppError> {
    let use_case = CreateTenantUseCase::new(state.tenants, state.users, state.audit);
    let tenant = use_case.execute(admin.id, request, Some(trace_id.as_str())).await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/tenants/{id}/status",
    tag = "admin",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Tenant id")),
    request_body = UpdateTenantStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = TenantDto),
        (status = 404, description = "Unknown tenant", body = ErrorBody),
    )
)]
pub async fn update_tenant_status(
    State(state): State<AppState>,
    admin: AuthUser,
    trace_id: TraceId,
    Path(tenant_id): Path<TenantId>,
    ValidatedJson(request): ValidatedJson<UpdateTenantStatusRequest>,
) -> Result<Json<TenantDto>, AppError> {
    let use_case = UpdateTenantStatusUseCase::new(state.tenants, state.audit);
    let tenant =
        use_case.execute(admin.id, tenant_id, request.status, Some(trace_id.as_str())).await?;
    Ok(Json(tenant))
}

/// Attach a user to any tenant, creating an organizer account when needed
#[utoipa::path(
    post,
    path = "/api/v1/admin/tenants/{id}/members",
    tag = "admin",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Tenant id")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberDto),
        (status = 404, description = "Unknown tenant or user", body = ErrorBody),
    )
)]
pub async fn add_tenant_member(
    State(state): State<AppState>,
    admin: AuthUser,
    trace_id: TraceId,
    Path(tenant_id): Path<TenantId>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberDto>), AppError> {
    let use_case = AddMemberUseCase::new(state.tenants, state.users, state.audit);
    let member = use_case.execute(admin.id, None, tenant_id, request, Some(trace_id.as_str())).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin",
    security(("bearer" = [])),
    params(PageQuery),
    responses((status = 200, description = "Accounts, newest first", body = [UserDto]))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<UserDto>>, AppError> {
    Ok(Json(ListUsersUseCase::new(state.users).execute(page.into()).await?))
}

/// Enable or disable an account
///
/// # Errors
/// Returns 400 `CANNOT_DEACTIVATE_SELF` when an administrator disables their own account
#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}/status",
    tag = "admin",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "User id")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = UserDto),
        (status = 400, description = "Self-deactivation", body = ErrorBody),
        (status = 404, description = "Unknown user", body = ErrorBody),
    )
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    admin: AuthUser,
    trace_id: TraceId,
    Path(user_id): Path<UserId>,
    ValidatedJson(request): ValidatedJson<UpdateUserStatusRequest>,
) -> Result<Json<UserDto>, AppError> {
    let use_case = UpdateUserStatusUseCase::new(state.users, state.audit);
    let user =
        use_case.execute(admin.id, user_id, request.is_active, Some(trace_id.as_str())).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/audit-logs",
    tag = "admin",
    security(("bearer" = [])),
    params(AuditLogQuery),
    responses((status = 200, description = "Audit entries, newest first", body = [AuditLogDto]))
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLogDto>>, AppError> {
    Ok(Json(ListAuditLogsUseCase::new(state.audit_logs).execute(query).await?))
}
