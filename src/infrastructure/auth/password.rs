use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::LazyLock;
use thiserror::Error;

use crate::presentation::middleware::error::AppError;

/// Hash verified when the account does not exist, so both paths cost the same
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("timing-equalizer-password").unwrap_or_default()
});

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal { message: err.to_string() }
    }
}

/// Hash a password into an Argon2id PHC string
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a password against a stored PHC string
pub fn verify_password(plain: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
}

/// Burn the same work as a real verification when no account matched
pub fn verify_against_dummy(plain: &str) {
    let _ = verify_password(plain, &DUMMY_HASH);
}

/// Run hashing on the blocking pool; argon2 is deliberately CPU heavy
pub async fn hash_password_blocking(plain: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| AppError::Internal { message: format!("hashing task failed: {e}") })?
        .map_err(AppError::from)
}

/// Verify on the blocking pool; `None` hash runs the dummy verification and returns false
pub async fn verify_password_blocking(
    plain: String,
    stored_hash: Option<String>,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&plain, &hash),
        None => {
            verify_against_dummy(&plain);
            Ok(false)
        }
    })
    .await
    .map_err(|e| AppError::Internal { message: format!("verification task failed: {e}") })?
    .map_err(AppError::from)
}
