use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        audit::{AuditEntry, AuditLogger},
        dto::{UpdateProfileRequest, UserDto},
    },
    domain::{
        entities::UserId,
        repositories::{Page, UserRepository},
    },
    presentation::middleware::error::AppError,
};

/// Use case for listing accounts
pub struct ListUsersUseCase {
    users: Arc<dyn UserRepository>,
}

impl ListUsersUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, page: Page) -> Result<Vec<UserDto>, AppError> {
        Ok(self.users.list(page).await?.into_iter().map(UserDto::from).collect())
    }
}

/// Use case for enabling or disabling an account
pub struct UpdateUserStatusUseCase {
    users: Arc<dyn UserRepository>,
    audit: AuditLogger,
}

impl UpdateUserStatusUseCase {
    pub fn new(users: Arc<dyn UserRepository>, audit: AuditLogger) -> Self {
        Self { users, audit }
    }

    pub async fn execute(
        &self,
        actor: UserId,
        user_id: UserId,
        is_active: bool,
        trace_id: Option<&str>,
    ) -> Result<UserDto, AppError> {
        if actor == user_id && !is_active {
            return Err(AppError::BadRequest {
                code: "CANNOT_DEACTIVATE_SELF",
                message: "Administrators cannot disable their own account".to_string(),
            });
        }

        let user = self
            .users
            .set_active(user_id, is_active)
            .await?
            .ok_or_else(|| AppError::NotFound { resource: format!("user {user_id}") })?;

        info!(user_id = %user.id, is_active, "User status changed");
        self.audit
            .record(
                AuditEntry::new("user.status", "user")
                    .entity(user.id)
                    .actor(actor)
                    .trace(trace_id)
                    .metadata(json!({ "isActive": is_active })),
            )
            .await;

        Ok(user.into())
    }
}

/// Use case for editing one's own profile
pub struct UpdateProfileUseCase {
    users: Arc<dyn UserRepository>,
}

impl UpdateProfileUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        request: UpdateProfileRequest,
    ) -> Result<UserDto, AppError> {
        let user = self
            .users
            .update_profile(user_id, request.full_name.trim())
            .await?
            .ok_or_else(|| AppError::NotFound { resource: format!("user {user_id}") })?;
        Ok(user.into())
    }
}

/// Use case for reading the caller's own account
pub struct GetProfileUseCase {
    users: Arc<dyn UserRepository>,
}

impl GetProfileUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<UserDto, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| AppError::NotFound { resource: format!("user {user_id}") })
    }
}
