use chrono::{DateTime, Utc};

use crate::domain::entities::{TenantId, User, UserId};
use crate::domain::value_objects::{MembershipRole, TenantStatus};

/// Organizer account namespace owning events and memberships
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    /// URL-safe unique handle, `[a-z0-9-]`
    pub slug: String,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub const SLUG_MIN_LEN: usize = 3;
    pub const SLUG_MAX_LEN: usize = 64;

    /// Create a new tenant awaiting activation
    #[must_use]
    pub fn new(name: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: TenantId::new(),
            name,
            slug,
            status: TenantStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check slug shape: lowercase alphanumerics and inner hyphens
    #[must_use]
    pub fn is_valid_slug(slug: &str) -> bool {
        (Self::SLUG_MIN_LEN..=Self::SLUG_MAX_LEN).contains(&slug.len())
            && slug.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            && !slug.starts_with('-')
            && !slug.ends_with('-')
    }
}

/// A user's role inside one tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantMembership {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
}

impl TenantMembership {
    #[must_use]
    pub fn new(tenant_id: TenantId, user_id: UserId, role: MembershipRole) -> Self {
        Self { tenant_id, user_id, role, created_at: Utc::now() }
    }
}

/// Result of the keyed tenant access lookup: the tenant plus the caller's membership, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantAccess {
    pub tenant: Tenant,
    pub membership: Option<TenantMembership>,
}

/// Membership joined with the member's account, for roster listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantMember {
    pub membership: TenantMembership,
    pub user: User,
}
