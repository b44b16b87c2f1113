use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::{
    Booking, Event, EventId, NewEvent, Tenant, TenantId, TenantMembership, User, UserId,
};
use crate::domain::repositories::{
    BookingRepository, EventRepository, TenantRepository, UserRepository,
};
use crate::domain::value_objects::{
    BookingStatus, Email, EventStatus, MembershipRole, TenantStatus, UserRole,
};
use crate::infrastructure::auth::hash_password;
use crate::infrastructure::persistence::InMemoryStore;
use crate::infrastructure::storage::{ObjectStorage, PresignedUpload, StorageError};
use crate::presentation::state::{AppState, Repositories};

/// Password every fixture user is created with
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Argon2 is slow on purpose, so fixtures hash once and share the result
static TEST_PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(TEST_PASSWORD).expect("hash test password"));

pub mod fixtures {
    use crate::infrastructure::config::{
        AppConfig, AuthConfig, DatabaseConfig, LogFormat, LoggingConfig, RuntimeMode,
        ServerConfig, StorageConfig,
    };

    pub fn test_config() -> AppConfig {
        AppConfig {
            mode: RuntimeMode::Local,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 4000,
                max_body_bytes: 1_048_576,
                request_timeout_seconds: 30,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
                min_connections: 1,
                acquire_timeout_seconds: 5,
                run_migrations: false,
            },
            auth: AuthConfig {
                issuer: "uae-trails-test".to_string(),
                access_token_secret: "test-access-secret-0123456789abcdefghij".to_string(),
                refresh_token_secret: "test-refresh-secret-0123456789abcdefghij".to_string(),
                access_token_ttl_minutes: 15,
                refresh_token_ttl_days: 7,
            },
            storage: StorageConfig {
                bucket: "uae-trails-media".to_string(),
                region: "me-central-1".to_string(),
                endpoint: None,
                public_base_url: None,
                upload_url_ttl_seconds: 900,
                max_upload_bytes: 10_485_760,
                allowed_content_types: vec![
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                    "image/webp".to_string(),
                    "application/pdf".to_string(),
                ],
            },
            logging: LoggingConfig { level: "debug".to_string(), format: LogFormat::Compact },
        }
    }
}

/// Object storage double that signs nothing
#[derive(Debug, Clone, Default)]
pub struct FakeObjectStorage;

#[async_trait]
impl ObjectStorage for FakeObjectStorage {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        _size: u64,
        ttl: Duration,
    ) -> Result<PresignedUpload, StorageError> {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());

        Ok(PresignedUpload {
            url: format!("https://storage.test/uae-trails-media/{key}?X-Amz-Signature=fake"),
            method: "PUT".to_string(),
            headers,
            expires_at: crate::infrastructure::storage::expires_at(ttl),
        })
    }

    fn public_url(&self, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory application wiring with helpers for seeding data
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(
            fixtures::test_config(),
            Repositories::in_memory(store.clone()),
            Arc::new(FakeObjectStorage),
        );
        Self { store, state }
    }

    pub async fn user(&self, email: &str, role: UserRole) -> User {
        let email = Email::parse(email).expect("fixture email");
        let user = User::new(email, TEST_PASSWORD_HASH.clone(), "Test User".to_string(), role);
        self.state.users.create(&user).await.expect("create user");
        user
    }

    pub async fn tenant(&self, status: TenantStatus) -> Tenant {
        let suffix = Uuid::new_v4().simple().to_string();
        let mut tenant =
            Tenant::new("Desert Trails".to_string(), format!("desert-trails-{}", &suffix[..8]));
        tenant.status = status;
        self.state.tenants.create(&tenant, None).await.expect("create tenant");
        tenant
    }

    pub async fn member(&self, tenant_id: TenantId, user_id: UserId, role: MembershipRole) {
        let membership = TenantMembership::new(tenant_id, user_id, role);
        self.state.tenants.upsert_member(&membership).await.expect("add member");
    }

    pub async fn event(
        &self,
        tenant_id: TenantId,
        created_by: UserId,
        capacity: u32,
        requires_approval: bool,
        status: EventStatus,
    ) -> Event {
        let starts_at = Utc::now() + ChronoDuration::days(7);
        let mut event = Event::draft(
            tenant_id,
            created_by,
            NewEvent {
                title: "Jebel Jais Sunrise Hike".to_string(),
                description: "Guided ascent before dawn".to_string(),
                location: "Ras Al Khaimah".to_string(),
                starts_at,
                ends_at: starts_at + ChronoDuration::hours(5),
                capacity,
                requires_approval,
                cover_image_key: None,
            },
        );
        event.status = status;
        self.state.events.create(&event).await.expect("create event");
        event
    }

    pub async fn booking(&self, event_id: EventId, user_id: UserId, status: BookingStatus) -> Booking {
        let booking = Booking::new(event_id, user_id, status, None);
        self.state.bookings.create(&booking).await.expect("create booking");
        booking
    }

    pub fn access_token(&self, user: &User) -> String {
        self.state.jwt.sign_access_token(user.id, user.role).expect("sign token")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
