use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::{
    application::{
        audit::{AuditEntry, AuditLogger},
        dto::{PresignRequest, PresignResponse},
    },
    domain::entities::{TenantId, UserId},
    infrastructure::{
        config::StorageConfig,
        storage::{object_key, ObjectStorage},
    },
    presentation::middleware::error::AppError,
};

/// Use case for issuing a presigned upload URL inside a tenant's key prefix
pub struct PresignUploadUseCase {
    storage: Arc<dyn ObjectStorage>,
    config: StorageConfig,
    audit: AuditLogger,
}

impl PresignUploadUseCase {
    pub fn new(storage: Arc<dyn ObjectStorage>, config: StorageConfig, audit: AuditLogger) -> Self {
        Self { storage, config, audit }
    }

    pub async fn execute(
        &self,
        actor: UserId,
        tenant_id: TenantId,
        request: PresignRequest,
        trace_id: Option<&str>,
    ) -> Result<PresignResponse, AppError> {
        if !self.config.is_allowed_content_type(&request.content_type) {
            return Err(AppError::UnsupportedMediaType { content_type: request.content_type });
        }
        if request.size > self.config.max_upload_bytes {
            return Err(AppError::PayloadTooLarge {
                message: format!(
                    "Upload of {} bytes exceeds the {} byte limit",
                    request.size, self.config.max_upload_bytes
                ),
            });
        }

        let key = object_key(tenant_id, request.purpose, &request.filename);
        let upload = self
            .storage
            .presign_upload(&key, &request.content_type, request.size, self.config.upload_url_ttl())
            .await?;

        info!(tenant_id = %tenant_id, key = %key, size = request.size, "Upload URL issued");
        self.audit
            .record(
                AuditEntry::new("media.presign", "object")
                    .entity(&key)
                    .tenant(tenant_id)
                    .actor(actor)
                    .trace(trace_id)
                    .metadata(json!({
                        "contentType": request.content_type,
                        "size": request.size,
                        "purpose": request.purpose,
                    })),
            )
            .await;

        Ok(PresignResponse {
            upload_url: upload.url,
            method: upload.method,
            headers: upload.headers,
            public_url: self.storage.public_url(&key),
            key,
            expires_at: upload.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::UploadPurpose;
    use crate::test_utils::TestContext;
    use claims::assert_matches;
    use rstest::rstest;

    fn request(content_type: &str, size: u64) -> PresignRequest {
        PresignRequest {
            filename: "Jebel Jais.png".to_string(),
            content_type: content_type.to_string(),
            size,
            purpose: UploadPurpose::EventCover,
        }
    }

    fn use_case(ctx: &TestContext) -> PresignUploadUseCase {
        PresignUploadUseCase::new(
            ctx.state.storage.clone(),
            ctx.state.config.storage.clone(),
            ctx.state.audit.clone(),
        )
    }

    #[tokio::test]
    async fn test_presign_returns_tenant_scoped_key() {
        let ctx = TestContext::new();
        let tenant_id = TenantId::new();

        let response = use_case(&ctx)
            .execute(UserId::new(), tenant_id, request("image/png", 1024), None)
            .await
            .unwrap();

        assert!(response.key.starts_with(&format!("tenants/{tenant_id}/event-cover/")));
        assert!(response.key.ends_with("-Jebel-Jais.png"));
        assert_eq!(response.method, "PUT");
        assert!(response.upload_url.contains(&response.key));
        assert_eq!(response.headers.get("content-type").map(String::as_str), Some("image/png"));
    }

    #[rstest]
    #[case("application/x-msdownload")]
    #[case("image/svg+xml")]
    #[tokio::test]
    async fn test_presign_rejects_disallowed_content_type(#[case] content_type: &str) {
        let ctx = TestContext::new();

        let err = use_case(&ctx)
            .execute(UserId::new(), TenantId::new(), request(content_type, 10), None)
            .await
            .unwrap_err();

        assert_matches!(err, AppError::UnsupportedMediaType { .. });
    }

    #[tokio::test]
    async fn test_presign_rejects_oversize_upload() {
        let ctx = TestContext::new();
        let max = ctx.state.config.storage.max_upload_bytes;

        assert!(use_case(&ctx)
            .execute(UserId::new(), TenantId::new(), request("image/png", max), None)
            .await
            .is_ok());

        let err = use_case(&ctx)
            .execute(UserId::new(), TenantId::new(), request("image/png", max + 1), None)
            .await
            .unwrap_err();
        assert_matches!(err, AppError::PayloadTooLarge { .. });
    }
}
