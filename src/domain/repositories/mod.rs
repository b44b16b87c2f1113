use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    AuditLog, Booking, BookingId, Event, EventId, Tenant, TenantAccess, TenantId, TenantMember,
    TenantMembership, User, UserId,
};
use crate::domain::value_objects::{BookingStatus, Email, TenantStatus};
use crate::presentation::middleware::error::AppError;

/// Offset pagination window shared by listing queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Build a page, clamping the limit into `1..=MAX_LIMIT`
    #[must_use]
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Repository for platform accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a duplicate e-mail surfaces as a database constraint error
    async fn create(&self, user: &User) -> Result<(), AppError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AppError>;

    /// List users ordered by creation time, newest first
    async fn list(&self, page: Page) -> Result<Vec<User>, AppError>;

    /// Activate or deactivate an account, returning the updated user
    async fn set_active(&self, id: UserId, is_active: bool) -> Result<Option<User>, AppError>;

    async fn update_profile(&self, id: UserId, full_name: &str) -> Result<Option<User>, AppError>;

    /// Verify the backing store is reachable
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Repository for tenants and their memberships
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Insert a tenant together with its optional first owner
    async fn create(
        &self,
        tenant: &Tenant,
        owner: Option<&TenantMembership>,
    ) -> Result<(), AppError>;

    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, AppError>;

    async fn list(&self, page: Page) -> Result<Vec<Tenant>, AppError>;

    async fn set_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> Result<Option<Tenant>, AppError>;

    /// Keyed lookup of a tenant and the given user's membership in it
    ///
    /// Returns `None` when the tenant does not exist.
    async fn find_access(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> Result<Option<TenantAccess>, AppError>;

    /// Insert a membership, or change the role of an existing one
    async fn upsert_member(&self, membership: &TenantMembership) -> Result<(), AppError>;

    async fn list_members(&self, tenant_id: TenantId) -> Result<Vec<TenantMember>, AppError>;
}

/// Repository for events
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<(), AppError>;

    async fn update(&self, event: &Event) -> Result<(), AppError>;

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, AppError>;

    /// List a tenant's events ordered by start time
    async fn list_by_tenant(&self, tenant_id: TenantId, page: Page) -> Result<Vec<Event>, AppError>;

    /// List published events starting at or after `from`, soonest first
    async fn list_published(
        &self,
        from: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Event>, AppError>;
}

/// Repository for bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking; a second booking for the same event and user is a constraint error
    async fn create(&self, booking: &Booking) -> Result<(), AppError>;

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, AppError>;

    async fn find_for_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<Booking>, AppError>;

    async fn list_by_event(&self, event_id: EventId) -> Result<Vec<Booking>, AppError>;

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, AppError>;

    /// Number of approved bookings held against an event
    async fn count_approved(&self, event_id: EventId) -> Result<u32, AppError>;

    async fn update_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Option<Booking>, AppError>;

    /// Move a cancelled booking to `status` with a fresh note
    ///
    /// Returns `None` when the booking is missing or no longer cancelled.
    async fn reopen(
        &self,
        id: BookingId,
        status: BookingStatus,
        note: Option<String>,
    ) -> Result<Option<Booking>, AppError>;
}

/// Filter for audit trail queries
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogFilter {
    pub tenant_id: Option<TenantId>,
    pub page: Page,
}

/// Append-only store for audit entries
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn insert(&self, entry: &AuditLog) -> Result<(), AppError>;

    /// Newest entries first
    async fn list(&self, filter: AuditLogFilter) -> Result<Vec<AuditLog>, AppError>;
}
