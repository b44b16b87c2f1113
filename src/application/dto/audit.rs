use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::entities::{AuditLog, AuditLogId, TenantId, UserId};
use crate::domain::repositories::{AuditLogFilter, Page};

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogQuery {
    /// Only entries of this tenant
    pub tenant_id: Option<TenantId>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<AuditLogQuery> for AuditLogFilter {
    fn from(query: AuditLogQuery) -> Self {
        Self { tenant_id: query.tenant_id, page: Page::new(query.limit, query.offset) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogDto {
    pub id: AuditLogId,
    pub tenant_id: Option<TenantId>,
    pub actor_id: Option<UserId>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub trace_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLog> for AuditLogDto {
    fn from(entry: AuditLog) -> Self {
        Self {
            id: entry.id,
            tenant_id: entry.tenant_id,
            actor_id: entry.actor_id,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            metadata: entry.metadata,
            trace_id: entry.trace_id,
            created_at: entry.created_at,
        }
    }
}
