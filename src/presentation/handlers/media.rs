use axum::{extract::State, Json};

use crate::application::dto::{PresignRequest, PresignResponse};
use crate::application::use_cases::PresignUploadUseCase;
use crate::presentation::middleware::{
    AppError, AuthUser, ErrorBody, TenantContext, TraceId, ValidatedJson,
};
use crate::presentation::state::AppState;

/// Issue a presigned URL for uploading one file straight to object storage
///
/// The client must `PUT` the file to `uploadUrl` with every header in `headers` before
/// `expiresAt`, then reference `key` (e.g. as an event's `coverImageKey`).
///
/// # Errors
/// Returns 415 for content types outside the allow-list and 413 when `size` exceeds the
/// configured maximum
#[utoipa::path(
    post,
    path = "/api/v1/media/presign",
    tag = "media",
    security(("bearer" = [])),
    params(("x-tenant-id" = uuid::Uuid, Header, description = "Tenant the upload belongs to")),
    request_body = PresignRequest,
    responses(
        (status = 200, description = "Upload presigned", body = PresignResponse),
        (status = 400, description = "Invalid filename or size", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 415, description = "Content type not allowed", body = ErrorBody),
    )
)]
pub async fn presign_upload(
    State(state): State<AppState>,
    user: AuthUser,
    tenant: TenantContext,
    trace_id: TraceId,
    ValidatedJson(request): ValidatedJson<PresignRequest>,
) -> Result<Json<PresignResponse>, AppError> {
    let use_case =
        PresignUploadUseCase::new(state.storage, state.config.storage.clone(), state.audit);
    let response =
        use_case.execute(user.id, tenant.tenant_id(), request, Some(trace_id.as_str())).await?;
    Ok(Json(response))
}
