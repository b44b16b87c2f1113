use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserDto};
use crate::application::use_cases::{
    GetProfileUseCase, LoginUseCase, RefreshTokenUseCase, RegisterUseCase,
};
use crate::presentation::middleware::{AppError, AuthUser, ErrorBody, TraceId, ValidatedJson};
use crate::presentation::state::AppState;

/// Create a participant account and sign it in
///
/// # Errors
/// Returns 400 for invalid input and 409 `EMAIL_TAKEN` when the e-mail is registered
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "E-mail already registered", body = ErrorBody),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    trace_id: TraceId,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let use_case = RegisterUseCase::new(state.users, state.jwt, state.audit);
    let response = use_case.execute(request, Some(trace_id.as_str())).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange credentials for a token pair
///
/// # Errors
/// Returns 401 for unknown e-mail or wrong password and 403 `USER_INACTIVE` for disabled accounts
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 403, description = "Account deactivated", body = ErrorBody),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    trace_id: TraceId,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let use_case = LoginUseCase::new(state.users, state.jwt, state.audit);
    Ok(Json(use_case.execute(request, Some(trace_id.as_str())).await?))
}

/// Exchange a refresh token for a new token pair
///
/// # Errors
/// Returns 401 when the refresh token is invalid, expired, or an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = AuthResponse),
        (status = 401, description = "Invalid refresh token", body = ErrorBody),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let use_case = RefreshTokenUseCase::new(state.users, state.jwt);
    Ok(Json(use_case.execute(request).await?))
}

/// The authenticated caller's account
///
/// # Errors
/// Returns 401 without a valid access token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    )
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<UserDto>, AppError> {
    Ok(Json(GetProfileUseCase::new(state.users).execute(user.id).await?))
}
