use std::sync::Arc;

use sqlx::PgPool;

use crate::application::audit::AuditLogger;
use crate::domain::repositories::{
    AuditLogRepository, BookingRepository, EventRepository, TenantRepository, UserRepository,
};
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::{
    InMemoryStore, PostgresAuditLogRepository, PostgresBookingRepository,
    PostgresEventRepository, PostgresTenantRepository, PostgresUserRepository,
};
use crate::infrastructure::storage::ObjectStorage;

/// The full set of repositories behind one backing store
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tenants: Arc<dyn TenantRepository>,
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub audit_logs: Arc<dyn AuditLogRepository>,
}

impl Repositories {
    /// Process-local store used in local mode when no database is configured
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            tenants: store.clone(),
            events: store.clone(),
            bookings: store.clone(),
            audit_logs: store,
        }
    }

    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            tenants: Arc::new(PostgresTenantRepository::new(pool.clone())),
            events: Arc::new(PostgresEventRepository::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRepository::new(pool.clone())),
            audit_logs: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
        }
    }
}

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: Arc<JwtService>,
    pub users: Arc<dyn UserRepository>,
    pub tenants: Arc<dyn TenantRepository>,
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub audit_logs: Arc<dyn AuditLogRepository>,
    pub audit: AuditLogger,
    pub storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repositories: Repositories,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let jwt = Arc::new(JwtService::new(&config.auth));
        let audit = AuditLogger::new(repositories.audit_logs.clone());

        Self {
            config: Arc::new(config),
            jwt,
            users: repositories.users,
            tenants: repositories.tenants,
            events: repositories.events,
            bookings: repositories.bookings,
            audit_logs: repositories.audit_logs,
            audit,
            storage,
        }
    }
}
