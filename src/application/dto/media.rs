use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::{FieldErrors, Validate};
use crate::infrastructure::storage::keys::MAX_FILENAME_LEN;
use crate::infrastructure::storage::UploadPurpose;
use crate::presentation::middleware::error::AppError;

/// Ask for a presigned upload URL
///
/// Content type and size are checked against the storage allow-list by the use case.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[schema(example = "jebel-jais.webp")]
    pub filename: String,
    #[schema(example = "image/webp")]
    pub content_type: String,
    /// Exact object size in bytes
    pub size: u64,
    #[serde(default)]
    pub purpose: UploadPurpose,
}

impl Validate for PresignRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.text("filename", &self.filename, MAX_FILENAME_LEN);
        errors.check(!self.content_type.trim().is_empty(), "contentType", "Must not be empty");
        errors.check(self.size > 0, "size", "Must be greater than 0");
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub upload_url: String,
    #[schema(example = "PUT")]
    pub method: String,
    /// Headers the upload request must carry
    pub headers: BTreeMap<String, String>,
    /// Object key to reference the upload, e.g. as `coverImageKey`
    pub key: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}
