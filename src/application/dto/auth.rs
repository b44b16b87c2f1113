use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FieldErrors, UserDto, Validate, MAX_NAME_LEN};
use crate::infrastructure::auth::TokenPair;
use crate::presentation::middleware::error::AppError;

/// Self-service sign up; always creates a participant account
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "hiker@example.ae")]
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.email("email", &self.email);
        errors.password("password", &self.password);
        errors.text("fullName", &self.full_name, MAX_NAME_LEN);
        errors.finish()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.check(!self.email.trim().is_empty(), "email", "Must not be empty");
        errors.check(!self.password.is_empty(), "password", "Must not be empty");
        errors.finish()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.check(!self.refresh_token.trim().is_empty(), "refreshToken", "Must not be empty");
        errors.finish()
    }
}

/// Tokens plus the account they were issued for
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserDto,
    pub tokens: TokenPair,
}
