use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{expires_at, join_public_url, ObjectStorage, PresignedUpload, StorageError};
use crate::infrastructure::config::StorageConfig;

/// Create an S3 client for the configured region and optional custom endpoint.
///
/// A custom endpoint (MinIO, LocalStack) switches to path-style addressing:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "me-central-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(endpoint_url.is_some())
        .build();

    Client::from_conf(s3_config)
}

/// [`ObjectStorage`] backed by S3 presigned `PutObject` requests
#[derive(Clone)]
pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
    public_base_url: Option<String>,
}

impl S3ObjectStorage {
    pub fn new(client: Client, bucket: impl Into<String>, public_base_url: Option<String>) -> Self {
        Self { client, bucket: bucket.into(), public_base_url }
    }

    /// Build from configuration, resolving credentials through the default AWS chain
    pub async fn from_config(config: &StorageConfig) -> Self {
        let client = create_s3_client(config.endpoint.as_deref(), &config.region).await;
        Self::new(client, config.bucket.clone(), config.public_base_url.clone())
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        size: u64,
        ttl: Duration,
    ) -> Result<PresignedUpload, StorageError> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| StorageError::InvalidConfiguration { message: e.to_string() })?;
        let content_length = i64::try_from(size)
            .map_err(|_| StorageError::Presign { message: format!("size {size} out of range") })?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(content_length)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign { message: e.to_string() })?;

        debug!(key, "Presigned upload URL issued");

        Ok(PresignedUpload {
            url: request.uri().to_string(),
            method: request.method().to_string(),
            headers: request
                .headers()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            expires_at: expires_at(ttl),
        })
    }

    fn public_url(&self, key: &str) -> Option<String> {
        join_public_url(self.public_base_url.as_deref(), key)
    }
}
