use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FieldErrors, Validate, MAX_NAME_LEN};
use crate::domain::entities::{Tenant, TenantId, TenantMember, UserId};
use crate::domain::value_objects::{MembershipRole, TenantStatus};
use crate::presentation::middleware::error::AppError;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,
    #[schema(example = "hajar-hikers")]
    pub slug: String,
    /// Existing account that becomes the tenant OWNER
    pub owner_email: Option<String>,
    /// Initial status, PENDING when omitted
    pub status: Option<TenantStatus>,
}

impl Validate for CreateTenantRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.text("name", &self.name, MAX_NAME_LEN);
        errors.check(
            Tenant::is_valid_slug(&self.slug),
            "slug",
            "Must be 3-64 characters of a-z, 0-9 and inner hyphens",
        );
        if let Some(email) = &self.owner_email {
            errors.email("ownerEmail", email);
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantStatusRequest {
    pub status: TenantStatus,
}

impl Validate for UpdateTenantStatusRequest {
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantDto {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tenant> for TenantDto {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            slug: tenant.slug,
            status: tenant.status,
            created_at: tenant.created_at,
            updated_at: tenant.updated_at,
        }
    }
}

/// Attach an account to a tenant, creating it when `fullName` and `password` are given
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub email: String,
    pub role: MembershipRole,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

impl Validate for AddMemberRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.email("email", &self.email);
        errors.optional_text("fullName", self.full_name.as_deref(), MAX_NAME_LEN);
        if let Some(password) = &self.password {
            errors.password("password", password);
        }
        errors.check(
            self.full_name.is_some() == self.password.is_some(),
            "password",
            "fullName and password must be given together",
        );
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: MembershipRole,
    pub joined_at: DateTime<Utc>,
}

impl From<TenantMember> for MemberDto {
    fn from(member: TenantMember) -> Self {
        Self {
            user_id: member.user.id,
            email: member.user.email.into(),
            full_name: member.user.full_name,
            role: member.membership.role,
            joined_at: member.membership.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tenant_slug_rule() {
        let request = CreateTenantRequest {
            name: "Hajar Hikers".to_string(),
            slug: "Hajar Hikers".to_string(),
            owner_email: None,
            status: None,
        };

        let Err(AppError::Validation { errors }) = request.validate() else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("slug"));
    }

    #[test]
    fn test_add_member_needs_name_and_password_together() {
        let request: AddMemberRequest = serde_json::from_str(
            r#"{"email":"guide@trails.ae","role":"STAFF","password":"long-enough-pw"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());

        let request: AddMemberRequest =
            serde_json::from_str(r#"{"email":"guide@trails.ae","role":"MANAGER"}"#).unwrap();
        assert!(request.validate().is_ok());
    }
}
