use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        audit::{AuditEntry, AuditLogger},
        dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest},
    },
    domain::{
        entities::User,
        repositories::UserRepository,
        value_objects::{Email, UserRole},
    },
    infrastructure::auth::{
        password::{hash_password_blocking, verify_password_blocking},
        JwtService,
    },
    presentation::middleware::error::AppError,
};

fn invalid_credentials() -> AppError {
    AppError::Authentication { message: "Invalid email or password".to_string() }
}

fn inactive_user() -> AppError {
    AppError::Forbidden { code: "USER_INACTIVE", message: "User account is disabled".to_string() }
}

fn issue(jwt: &JwtService, user: User) -> Result<AuthResponse, AppError> {
    let tokens = jwt.issue_pair(user.id, user.role)?;
    Ok(AuthResponse { user: user.into(), tokens })
}

/// Use case for self-service participant registration
pub struct RegisterUseCase {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    audit: AuditLogger,
}

impl RegisterUseCase {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>, audit: AuditLogger) -> Self {
        Self { users, jwt, audit }
    }

    pub async fn execute(
        &self,
        request: RegisterRequest,
        trace_id: Option<&str>,
    ) -> Result<AuthResponse, AppError> {
        let email = Email::parse(&request.email)
            .map_err(|e| AppError::invalid_field("email", e.to_string()))?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict {
                code: "EMAIL_TAKEN",
                message: "An account with this email already exists".to_string(),
            });
        }

        let password_hash = hash_password_blocking(request.password).await?;
        let user =
            User::new(email, password_hash, request.full_name.trim().to_string(), UserRole::Participant);
        self.users.create(&user).await?;

        info!(user_id = %user.id, "Registered new participant");
        self.audit
            .record(
                AuditEntry::new("user.register", "user")
                    .entity(user.id)
                    .actor(user.id)
                    .trace(trace_id),
            )
            .await;

        issue(&self.jwt, user)
    }
}

/// Use case for password login
pub struct LoginUseCase {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    audit: AuditLogger,
}

impl LoginUseCase {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>, audit: AuditLogger) -> Self {
        Self { users, jwt, audit }
    }

    pub async fn execute(
        &self,
        request: LoginRequest,
        trace_id: Option<&str>,
    ) -> Result<AuthResponse, AppError> {
        let user = match Email::parse(&request.email) {
            Ok(email) => self.users.find_by_email(&email).await?,
            Err(_) => None,
        };

        // Unknown accounts still pay for a hash verification
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let valid = verify_password_blocking(request.password, stored_hash).await?;

        let Some(user) = user.filter(|_| valid) else {
            return Err(invalid_credentials());
        };
        if !user.is_active {
            return Err(inactive_user());
        }

        self.audit
            .record(AuditEntry::new("user.login", "user").entity(user.id).actor(user.id).trace(trace_id))
            .await;

        issue(&self.jwt, user)
    }
}

/// Use case for exchanging a refresh token for a new token pair
pub struct RefreshTokenUseCase {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl RefreshTokenUseCase {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    pub async fn execute(&self, request: RefreshRequest) -> Result<AuthResponse, AppError> {
        let claims = self.jwt.verify_refresh_token(&request.refresh_token)?;
        let user = self
            .users
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or_else(|| AppError::Authentication { message: "Invalid token".to_string() })?;

        if !user.is_active {
            return Err(inactive_user());
        }

        // Role is re-read so promotions and demotions apply on the next refresh
        issue(&self.jwt, user)
    }
}
