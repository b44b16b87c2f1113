//! Object key layout for tenant uploads.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::entities::TenantId;

pub const MAX_FILENAME_LEN: usize = 255;
const MAX_KEY_FILENAME_LEN: usize = 100;

/// What an upload is for; becomes a path segment of the object key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UploadPurpose {
    #[default]
    EventCover,
    EventGallery,
    TenantLogo,
    Document,
}

impl UploadPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EventCover => "event-cover",
            Self::EventGallery => "event-gallery",
            Self::TenantLogo => "tenant-logo",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for UploadPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduce a client-supplied filename to a safe key segment
///
/// Directory components are dropped, anything outside `[A-Za-z0-9._-]` becomes
/// `-`, runs of `-` collapse, and leading dots or dashes are stripped.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_start_matches(['.', '-']).trim_end_matches('-');
    let mut result: String = trimmed.chars().take(MAX_KEY_FILENAME_LEN).collect();
    if result.is_empty() {
        result.push_str("file");
    }
    result
}

/// `tenants/{tenant_id}/{purpose}/{uuid}-{sanitized filename}`
pub fn object_key(tenant_id: TenantId, purpose: UploadPurpose, filename: &str) -> String {
    format!("tenants/{tenant_id}/{purpose}/{}-{}", Uuid::new_v4(), sanitize_filename(filename))
}
