use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        audit::{AuditEntry, AuditLogger},
        dto::{AddMemberRequest, CreateTenantRequest, MemberDto, TenantDto},
    },
    domain::{
        entities::{Tenant, TenantId, TenantMember, TenantMembership, User, UserId},
        repositories::{Page, TenantRepository, UserRepository},
        value_objects::{Email, MembershipRole, TenantStatus, UserRole},
    },
    infrastructure::auth::password::hash_password_blocking,
    presentation::middleware::error::AppError,
};

fn tenant_not_found(id: TenantId) -> AppError {
    AppError::NotFound { resource: format!("tenant {id}") }
}

/// Use case for creating a tenant, optionally with its first owner
pub struct CreateTenantUseCase {
    tenants: Arc<dyn TenantRepository>,
    users: Arc<dyn UserRepository>,
    audit: AuditLogger,
}

impl CreateTenantUseCase {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        users: Arc<dyn UserRepository>,
        audit: AuditLogger,
    ) -> Self {
        Self { tenants, users, audit }
    }

    pub async fn execute(
        &self,
        actor: UserId,
        request: CreateTenantRequest,
        trace_id: Option<&str>,
    ) -> Result<TenantDto, AppError> {
        let mut tenant = Tenant::new(request.name.trim().to_string(), request.slug);
        if let Some(status) = request.status {
            tenant.status = status;
        }

        let owner = match request.owner_email.as_deref() {
            Some(raw) => {
                let email =
                    Email::parse(raw).map_err(|e| AppError::invalid_field("ownerEmail", e.to_string()))?;
                let user = self
                    .users
                    .find_by_email(&email)
                    .await?
                    .ok_or_else(|| AppError::invalid_field("ownerEmail", "No account with this email"))?;
                Some(TenantMembership::new(tenant.id, user.id, MembershipRole::Owner))
            }
            None => None,
        };

        self.tenants.create(&tenant, owner.as_ref()).await?;
        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant created");

        self.audit
            .record(
                AuditEntry::new("tenant.create", "tenant")
                    .entity(tenant.id)
                    .tenant(tenant.id)
                    .actor(actor)
                    .trace(trace_id)
                    .metadata(json!({
                        "slug": tenant.slug,
                        "ownerId": owner.as_ref().map(|m| m.user_id),
                    })),
            )
            .await;

        Ok(tenant.into())
    }
}

/// Use case for listing tenants
pub struct ListTenantsUseCase {
    tenants: Arc<dyn TenantRepository>,
}

impl ListTenantsUseCase {
    pub fn new(tenants: Arc<dyn TenantRepository>) -> Self {
        Self { tenants }
    }

    pub async fn execute(&self, page: Page) -> Result<Vec<TenantDto>, AppError> {
        Ok(self.tenants.list(page).await?.into_iter().map(TenantDto::from).collect())
    }
}

/// Use case for activating or suspending a tenant
pub struct UpdateTenantStatusUseCase {
    tenants: Arc<dyn TenantRepository>,
    audit: AuditLogger,
}

impl UpdateTenantStatusUseCase {
    pub fn new(tenants: Arc<dyn TenantRepository>, audit: AuditLogger) -> Self {
        Self { tenants, audit }
    }

    pub async fn execute(
        &self,
        actor: UserId,
        tenant_id: TenantId,
        status: TenantStatus,
        trace_id: Option<&str>,
    ) -> Result<TenantDto, AppError> {
        let tenant = self
            .tenants
            .set_status(tenant_id, status)
            .await?
            .ok_or_else(|| tenant_not_found(tenant_id))?;

        info!(tenant_id = %tenant.id, status = %tenant.status, "Tenant status changed");
        self.audit
            .record(
                AuditEntry::new("tenant.status", "tenant")
                    .entity(tenant.id)
                    .tenant(tenant.id)
                    .actor(actor)
                    .trace(trace_id)
                    .metadata(json!({ "status": status })),
            )
            .await;

        Ok(tenant.into())
    }
}

/// Use case for attaching an account to a tenant, creating the account when asked to
pub struct AddMemberUseCase {
    tenants: Arc<dyn TenantRepository>,
    users: Arc<dyn UserRepository>,
    audit: AuditLogger,
}

impl AddMemberUseCase {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        users: Arc<dyn UserRepository>,
        audit: AuditLogger,
    ) -> Self {
        Self { tenants, users, audit }
    }

    /// `actor_role` is the caller's role in the tenant; `None` for a platform admin.
    ///
    /// Only owners may grant the OWNER role or change an owner's role, and the last
    /// owner cannot be demoted.
    pub async fn execute(
        &self,
        actor: UserId,
        actor_role: Option<MembershipRole>,
        tenant_id: TenantId,
        request: AddMemberRequest,
        trace_id: Option<&str>,
    ) -> Result<MemberDto, AppError> {
        let actor_is_owner = actor_role.is_none_or(|role| role == MembershipRole::Owner);
        if request.role == MembershipRole::Owner && !actor_is_owner {
            return Err(owners_only("Only owners may grant the OWNER role"));
        }
        if self.tenants.find_by_id(tenant_id).await?.is_none() {
            return Err(tenant_not_found(tenant_id));
        }

        let email = Email::parse(&request.email)
            .map_err(|e| AppError::invalid_field("email", e.to_string()))?;

        let (user, created) = match self.users.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let (Some(full_name), Some(password)) = (request.full_name, request.password) else {
                    return Err(AppError::NotFound { resource: format!("user {email}") });
                };
                let password_hash = hash_password_blocking(password).await?;
                let user = User::new(email, password_hash, full_name.trim().to_string(), UserRole::Organizer);
                self.users.create(&user).await?;
                (user, true)
            }
        };

        if !created {
            self.check_role_change(tenant_id, user.id, request.role, actor_is_owner).await?;
        }

        let membership = TenantMembership::new(tenant_id, user.id, request.role);
        self.tenants.upsert_member(&membership).await?;

        info!(tenant_id = %tenant_id, user_id = %user.id, role = %membership.role, "Member added");
        self.audit
            .record(
                AuditEntry::new("tenant.member.add", "tenant_membership")
                    .entity(user.id)
                    .tenant(tenant_id)
                    .actor(actor)
                    .trace(trace_id)
                    .metadata(json!({ "role": membership.role, "accountCreated": created })),
            )
            .await;

        Ok(TenantMember { membership, user }.into())
    }
}

impl AddMemberUseCase {
    async fn check_role_change(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        role: MembershipRole,
        actor_is_owner: bool,
    ) -> Result<(), AppError> {
        let current = self
            .tenants
            .find_access(tenant_id, user_id)
            .await?
            .and_then(|access| access.membership)
            .map(|membership| membership.role);
        if current != Some(MembershipRole::Owner) || role == MembershipRole::Owner {
            return Ok(());
        }
        if !actor_is_owner {
            return Err(owners_only("Only owners may change an owner's role"));
        }

        let owners = self
            .tenants
            .list_members(tenant_id)
            .await?
            .iter()
            .filter(|member| member.membership.role == MembershipRole::Owner)
            .count();
        if owners <= 1 {
            return Err(AppError::Conflict {
                code: "LAST_OWNER",
                message: "A tenant must keep at least one owner".to_string(),
            });
        }
        Ok(())
    }
}

fn owners_only(message: &str) -> AppError {
    AppError::Forbidden { code: "FORBIDDEN", message: message.to_string() }
}

/// Use case for listing a tenant's members
pub struct ListMembersUseCase {
    tenants: Arc<dyn TenantRepository>,
}

impl ListMembersUseCase {
    pub fn new(tenants: Arc<dyn TenantRepository>) -> Self {
        Self { tenants }
    }

    pub async fn execute(&self, tenant_id: TenantId) -> Result<Vec<MemberDto>, AppError> {
        Ok(self.tenants.list_members(tenant_id).await?.into_iter().map(MemberDto::from).collect())
    }
}
