use chrono::{DateTime, Utc};

use crate::domain::entities::UserId;
use crate::domain::value_objects::{Email, UserRole};

/// Platform account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// Argon2id PHC string, never serialized to clients
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user
    #[must_use]
    pub fn new(email: Email, password_hash: String, full_name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            password_hash,
            full_name,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
