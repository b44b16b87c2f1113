use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;

use uae_trails_api::infrastructure::config::{
    AppConfig, AuthConfig, DatabaseConfig, LogFormat, LoggingConfig, RuntimeMode, ServerConfig,
    StorageConfig,
};
use uae_trails_api::infrastructure::storage::{ObjectStorage, PresignedUpload, StorageError};

pub const PASSWORD: &str = "wadi-shawka-2024";

pub fn config() -> AppConfig {
    AppConfig {
        mode: RuntimeMode::Local,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_seconds: 1,
            run_migrations: false,
        },
        auth: AuthConfig {
            issuer: "uae-trails-it".to_string(),
            access_token_secret: "integration-access-secret-abcdefghijklmnop".to_string(),
            refresh_token_secret: "integration-refresh-secret-abcdefghijklmnop".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
        },
        storage: StorageConfig {
            bucket: "trails-it".to_string(),
            region: "me-central-1".to_string(),
            endpoint: None,
            public_base_url: Some("https://cdn.trails.test".to_string()),
            upload_url_ttl_seconds: 600,
            max_upload_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        },
        logging: LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact },
    }
}

/// Storage double; URLs look presigned but nothing is signed
pub struct RecordingStorage;

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        size: u64,
        ttl: Duration,
    ) -> Result<PresignedUpload, StorageError> {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        headers.insert("content-length".to_string(), size.to_string());

        Ok(PresignedUpload {
            url: format!("https://s3.test/trails-it/{key}?X-Amz-Expires={}", ttl.as_secs()),
            method: "PUT".to_string(),
            headers,
            expires_at: Utc::now() + ChronoDuration::from_std(ttl).unwrap(),
        })
    }

    fn public_url(&self, key: &str) -> Option<String> {
        Some(format!("https://cdn.trails.test/{key}"))
    }
}

/// Body for creating an event a week from now
pub fn new_event(title: &str, capacity: u32, requires_approval: bool) -> Value {
    let starts_at = Utc::now() + ChronoDuration::days(7);
    json!({
        "title": title,
        "description": "Bring two litres of water",
        "location": "Hatta",
        "startsAt": starts_at,
        "endsAt": starts_at + ChronoDuration::hours(4),
        "capacity": capacity,
        "requiresApproval": requires_approval,
    })
}
