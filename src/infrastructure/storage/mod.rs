use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

pub mod keys;
mod s3_storage;

pub use keys::{object_key, sanitize_filename, UploadPurpose};
pub use s3_storage::{create_s3_client, S3ObjectStorage};

use crate::presentation::middleware::error::AppError;

/// Error types for object storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to presign request: {message}")]
    Presign { message: String },

    #[error("Invalid storage configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage { message: err.to_string() }
    }
}

/// A time-limited upload the client performs directly against the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    pub url: String,
    pub method: String,
    /// Headers the client must send verbatim for the signature to match
    pub headers: BTreeMap<String, String>,
    pub expires_at: DateTime<Utc>,
}

/// Object storage that hands out presigned upload URLs
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Presign a `PUT` of `size` bytes of `content_type` to `key`, valid for `ttl`
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        size: u64,
        ttl: Duration,
    ) -> Result<PresignedUpload, StorageError>;

    /// Public URL an uploaded object is served from, when the bucket is fronted by one
    fn public_url(&self, key: &str) -> Option<String>;
}

/// Expiry instant for a presigned request issued now
pub(crate) fn expires_at(ttl: Duration) -> DateTime<Utc> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
    Utc::now() + ttl
}

/// Join a public base URL and an object key
pub(crate) fn join_public_url(base: Option<&str>, key: &str) -> Option<String> {
    base.map(|base| format!("{}/{}", base.trim_end_matches('/'), key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_public_url() {
        assert_eq!(
            join_public_url(Some("https://cdn.example.ae/"), "tenants/a/b.png").as_deref(),
            Some("https://cdn.example.ae/tenants/a/b.png")
        );
        assert_eq!(join_public_url(None, "tenants/a/b.png"), None);
    }

    #[test]
    fn test_expires_at_is_in_the_future() {
        let now = Utc::now();
        let expiry = expires_at(Duration::from_secs(900));
        assert!(expiry > now);
        assert!(expiry <= now + chrono::Duration::seconds(901));
    }
}
