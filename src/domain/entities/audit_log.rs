use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::entities::{AuditLogId, TenantId, UserId};

/// Persisted record of a state-changing action
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub tenant_id: Option<TenantId>,
    pub actor_id: Option<UserId>,
    /// Dotted action name, e.g. `booking.approve`
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub metadata: Value,
    pub trace_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
