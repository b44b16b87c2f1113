pub mod audit_log_repository;
pub mod booking_repository;
pub mod connection;
pub mod event_repository;
pub mod memory;
mod rows;
pub mod tenant_repository;
pub mod user_repository;

pub use audit_log_repository::PostgresAuditLogRepository;
pub use booking_repository::PostgresBookingRepository;
pub use connection::Database;
pub use event_repository::PostgresEventRepository;
pub use memory::InMemoryStore;
pub use tenant_repository::PostgresTenantRepository;
pub use user_repository::PostgresUserRepository;
