//! In-memory repositories for local runs without a database and for tests.
//!
//! Unique and foreign key violations surface with the same `DB_<SQLSTATE>` codes
//! the Postgres repositories produce, so callers see identical errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::entities::{
    AuditLog, Booking, BookingId, Event, EventId, Tenant, TenantAccess, TenantId, TenantMember,
    TenantMembership, User, UserId,
};
use crate::domain::repositories::{
    AuditLogFilter, AuditLogRepository, BookingRepository, EventRepository, Page,
    TenantRepository, UserRepository,
};
use crate::domain::value_objects::{BookingStatus, Email, EventStatus, TenantStatus};
use crate::presentation::middleware::error::AppError;

const UNIQUE_VIOLATION: &str = "DB_23505";
const FOREIGN_KEY_VIOLATION: &str = "DB_23503";

fn unique_violation() -> AppError {
    AppError::Database {
        code: UNIQUE_VIOLATION.to_string(),
        message: "A record with the same unique value already exists".to_string(),
    }
}

fn foreign_key_violation() -> AppError {
    AppError::Database {
        code: FOREIGN_KEY_VIOLATION.to_string(),
        message: "A referenced record does not exist".to_string(),
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, AppError> {
    lock.read().map_err(|_| AppError::Internal { message: "in-memory store poisoned".to_string() })
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, AppError> {
    lock.write().map_err(|_| AppError::Internal { message: "in-memory store poisoned".to_string() })
}

fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
    items.into_iter().skip(page.offset as usize).take(page.limit as usize).collect()
}

/// All tables in one place so cross-table checks see a consistent view
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    tenants: RwLock<HashMap<TenantId, Tenant>>,
    memberships: RwLock<HashMap<(TenantId, UserId), TenantMembership>>,
    events: RwLock<HashMap<EventId, Event>>,
    bookings: RwLock<HashMap<BookingId, Booking>>,
    audit_logs: RwLock<Vec<AuditLog>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn user_exists(&self, id: UserId) -> Result<bool, AppError> {
        Ok(read(&self.users)?.contains_key(&id))
    }

    fn tenant_exists(&self, id: TenantId) -> Result<bool, AppError> {
        Ok(read(&self.tenants)?.contains_key(&id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User) -> Result<(), AppError> {
        let mut users = write(&self.users)?;
        if users.values().any(|u| u.email == user.email) || users.contains_key(&user.id) {
            return Err(unique_violation());
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AppError> {
        Ok(read(&self.users)?.values().find(|u| &u.email == email).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = read(&self.users)?.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(users, page))
    }

    async fn set_active(&self, id: UserId, is_active: bool) -> Result<Option<User>, AppError> {
        let mut users = write(&self.users)?;
        Ok(users.get_mut(&id).map(|user| {
            user.is_active = is_active;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_profile(&self, id: UserId, full_name: &str) -> Result<Option<User>, AppError> {
        let mut users = write(&self.users)?;
        Ok(users.get_mut(&id).map(|user| {
            user.full_name = full_name.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        read(&self.users).map(|_| ())
    }
}

#[async_trait]
impl TenantRepository for InMemoryStore {
    async fn create(
        &self,
        tenant: &Tenant,
        owner: Option<&TenantMembership>,
    ) -> Result<(), AppError> {
        if let Some(owner) = owner {
            if !self.user_exists(owner.user_id)? {
                return Err(foreign_key_violation());
            }
        }

        let mut tenants = write(&self.tenants)?;
        if tenants.values().any(|t| t.slug == tenant.slug) || tenants.contains_key(&tenant.id) {
            return Err(unique_violation());
        }
        tenants.insert(tenant.id, tenant.clone());

        if let Some(owner) = owner {
            write(&self.memberships)?.insert((owner.tenant_id, owner.user_id), owner.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, AppError> {
        Ok(read(&self.tenants)?.get(&id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Tenant>, AppError> {
        let mut tenants: Vec<Tenant> = read(&self.tenants)?.values().cloned().collect();
        tenants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(tenants, page))
    }

    async fn set_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> Result<Option<Tenant>, AppError> {
        let mut tenants = write(&self.tenants)?;
        Ok(tenants.get_mut(&id).map(|tenant| {
            tenant.status = status;
            tenant.updated_at = Utc::now();
            tenant.clone()
        }))
    }

    async fn find_access(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> Result<Option<TenantAccess>, AppError> {
        let Some(tenant) = read(&self.tenants)?.get(&tenant_id).cloned() else {
            return Ok(None);
        };
        let membership = read(&self.memberships)?.get(&(tenant_id, user_id)).cloned();
        Ok(Some(TenantAccess { tenant, membership }))
    }

    async fn upsert_member(&self, membership: &TenantMembership) -> Result<(), AppError> {
        if !self.tenant_exists(membership.tenant_id)? || !self.user_exists(membership.user_id)? {
            return Err(foreign_key_violation());
        }

        let mut memberships = write(&self.memberships)?;
        memberships
            .entry((membership.tenant_id, membership.user_id))
            .and_modify(|existing| existing.role = membership.role)
            .or_insert_with(|| membership.clone());
        Ok(())
    }

    async fn list_members(&self, tenant_id: TenantId) -> Result<Vec<TenantMember>, AppError> {
        let users = read(&self.users)?;
        let mut members: Vec<TenantMember> = read(&self.memberships)?
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .filter_map(|m| {
                users.get(&m.user_id).map(|user| TenantMember { membership: m.clone(), user: user.clone() })
            })
            .collect();
        members.sort_by(|a, b| a.membership.created_at.cmp(&b.membership.created_at));
        Ok(members)
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create(&self, event: &Event) -> Result<(), AppError> {
        if !self.tenant_exists(event.tenant_id)? || !self.user_exists(event.created_by)? {
            return Err(foreign_key_violation());
        }
        let mut events = write(&self.events)?;
        if events.contains_key(&event.id) {
            return Err(unique_violation());
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), AppError> {
        let mut events = write(&self.events)?;
        match events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(())
            }
            None => Err(AppError::NotFound { resource: "event".to_string() }),
        }
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, AppError> {
        Ok(read(&self.events)?.get(&id).cloned())
    }

    async fn list_by_tenant(&self, tenant_id: TenantId, page: Page) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> =
            read(&self.events)?.values().filter(|e| e.tenant_id == tenant_id).cloned().collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(paginate(events, page))
    }

    async fn list_published(
        &self,
        from: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = read(&self.events)?
            .values()
            .filter(|e| e.status == EventStatus::Published && e.starts_at >= from)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(paginate(events, page))
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn create(&self, booking: &Booking) -> Result<(), AppError> {
        if !read(&self.events)?.contains_key(&booking.event_id) || !self.user_exists(booking.user_id)? {
            return Err(foreign_key_violation());
        }
        let mut bookings = write(&self.bookings)?;
        if bookings.contains_key(&booking.id)
            || bookings.values().any(|b| b.event_id == booking.event_id && b.user_id == booking.user_id)
        {
            return Err(unique_violation());
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, AppError> {
        Ok(read(&self.bookings)?.get(&id).cloned())
    }

    async fn find_for_user(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<Booking>, AppError> {
        Ok(read(&self.bookings)?
            .values()
            .find(|b| b.event_id == event_id && b.user_id == user_id)
            .cloned())
    }

    async fn list_by_event(&self, event_id: EventId) -> Result<Vec<Booking>, AppError> {
        let mut bookings: Vec<Booking> =
            read(&self.bookings)?.values().filter(|b| b.event_id == event_id).cloned().collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, AppError> {
        let mut bookings: Vec<Booking> =
            read(&self.bookings)?.values().filter(|b| b.user_id == user_id).cloned().collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn count_approved(&self, event_id: EventId) -> Result<u32, AppError> {
        let approved = read(&self.bookings)?
            .values()
            .filter(|b| b.event_id == event_id && b.status == BookingStatus::Approved)
            .count();
        Ok(u32::try_from(approved).unwrap_or(u32::MAX))
    }

    async fn update_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let mut bookings = write(&self.bookings)?;
        Ok(bookings.get_mut(&id).map(|booking| {
            booking.status = status;
            booking.updated_at = Utc::now();
            booking.clone()
        }))
    }

    async fn reopen(
        &self,
        id: BookingId,
        status: BookingStatus,
        note: Option<String>,
    ) -> Result<Option<Booking>, AppError> {
        let mut bookings = write(&self.bookings)?;
        Ok(bookings.get_mut(&id).filter(|b| b.status == BookingStatus::Cancelled).map(|booking| {
            booking.status = status;
            booking.note = note;
            booking.updated_at = Utc::now();
            booking.clone()
        }))
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryStore {
    async fn insert(&self, entry: &AuditLog) -> Result<(), AppError> {
        write(&self.audit_logs)?.push(entry.clone());
        Ok(())
    }

    async fn list(&self, filter: AuditLogFilter) -> Result<Vec<AuditLog>, AppError> {
        let entries: Vec<AuditLog> = read(&self.audit_logs)?
            .iter()
            .rev()
            .filter(|e| filter.tenant_id.is_none() || e.tenant_id == filter.tenant_id)
            .cloned()
            .collect();
        Ok(paginate(entries, filter.page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{MembershipRole, UserRole};
    use claims::{assert_matches, assert_none, assert_ok, assert_some};

    fn user(email: &str) -> User {
        User::new(
            Email::parse(email).unwrap(),
            "hash".to_string(),
            "Test User".to_string(),
            UserRole::Participant,
        )
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let store = InMemoryStore::new();
        assert_ok!(UserRepository::create(&store, &user("a@trails.ae")).await);

        let err = UserRepository::create(&store, &user("A@Trails.ae")).await.unwrap_err();

        assert_matches!(err, AppError::Database { ref code, .. } if code == "DB_23505");
    }

    #[tokio::test]
    async fn test_find_access_distinguishes_missing_tenant_and_non_member() {
        let store = InMemoryStore::new();
        let owner = user("owner@trails.ae");
        let stranger = user("stranger@trails.ae");
        UserRepository::create(&store, &owner).await.unwrap();
        UserRepository::create(&store, &stranger).await.unwrap();

        let tenant = Tenant::new("Hajar Hikers".to_string(), "hajar-hikers".to_string());
        let membership = TenantMembership::new(tenant.id, owner.id, MembershipRole::Owner);
        TenantRepository::create(&store, &tenant, Some(&membership)).await.unwrap();

        assert_none!(store.find_access(TenantId::new(), owner.id).await.unwrap());

        let access = assert_some!(store.find_access(tenant.id, owner.id).await.unwrap());
        assert_eq!(access.membership.map(|m| m.role), Some(MembershipRole::Owner));

        let access = assert_some!(store.find_access(tenant.id, stranger.id).await.unwrap());
        assert_none!(access.membership);
    }

    #[tokio::test]
    async fn test_upsert_member_changes_role() {
        let store = InMemoryStore::new();
        let member = user("staff@trails.ae");
        UserRepository::create(&store, &member).await.unwrap();
        let tenant = Tenant::new("Desert Trails".to_string(), "desert-trails".to_string());
        TenantRepository::create(&store, &tenant, None).await.unwrap();

        store
            .upsert_member(&TenantMembership::new(tenant.id, member.id, MembershipRole::Staff))
            .await
            .unwrap();
        store
            .upsert_member(&TenantMembership::new(tenant.id, member.id, MembershipRole::Manager))
            .await
            .unwrap();

        let members = store.list_members(tenant.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].membership.role, MembershipRole::Manager);
    }

    #[tokio::test]
    async fn test_member_of_unknown_tenant_is_foreign_key_violation() {
        let store = InMemoryStore::new();
        let member = user("staff@trails.ae");
        UserRepository::create(&store, &member).await.unwrap();

        let err = store
            .upsert_member(&TenantMembership::new(TenantId::new(), member.id, MembershipRole::Staff))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "DB_23503");
    }

    #[tokio::test]
    async fn test_audit_log_filter_and_order() {
        let store = InMemoryStore::new();
        let tenant_id = TenantId::new();
        for (i, tenant) in [Some(tenant_id), None, Some(tenant_id)].into_iter().enumerate() {
            store
                .insert(&AuditLog {
                    id: crate::domain::entities::AuditLogId::new(),
                    tenant_id: tenant,
                    actor_id: None,
                    action: format!("action.{i}"),
                    entity_type: "test".to_string(),
                    entity_id: None,
                    metadata: serde_json::json!({}),
                    trace_id: None,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let all = AuditLogRepository::list(&store, AuditLogFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].action, "action.2");

        let scoped = AuditLogRepository::list(
            &store,
            AuditLogFilter { tenant_id: Some(tenant_id), page: Page::default() },
        )
        .await
        .unwrap();
        assert_eq!(scoped.len(), 2);
    }
}
