//! Best-effort audit trail.
//!
//! Writes never fail the request that triggered them: a failed insert is
//! logged and dropped.

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::{AuditLog, AuditLogId, TenantId, UserId};
use crate::domain::repositories::AuditLogRepository;

/// One state-changing action to record
#[derive(Debug, Clone)]
pub struct AuditEntry {
    action: &'static str,
    entity_type: &'static str,
    entity_id: Option<String>,
    tenant_id: Option<TenantId>,
    actor_id: Option<UserId>,
    trace_id: Option<String>,
    metadata: Value,
}

impl AuditEntry {
    pub fn new(action: &'static str, entity_type: &'static str) -> Self {
        Self {
            action,
            entity_type,
            entity_id: None,
            tenant_id: None,
            actor_id: None,
            trace_id: None,
            metadata: json!({}),
        }
    }

    #[must_use]
    pub fn entity(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    #[must_use]
    pub fn actor(mut self, actor_id: UserId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    #[must_use]
    pub fn trace(mut self, trace_id: Option<&str>) -> Self {
        self.trace_id = trace_id.map(String::from);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    fn into_log(self) -> AuditLog {
        AuditLog {
            id: AuditLogId::new(),
            tenant_id: self.tenant_id,
            actor_id: self.actor_id,
            action: self.action.to_string(),
            entity_type: self.entity_type.to_string(),
            entity_id: self.entity_id,
            metadata: self.metadata,
            trace_id: self.trace_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct AuditLogger {
    repository: Arc<dyn AuditLogRepository>,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn AuditLogRepository>) -> Self {
        Self { repository }
    }

    /// Persist the entry; failures are logged and swallowed
    pub async fn record(&self, entry: AuditEntry) {
        let log = entry.into_log();
        match self.repository.insert(&log).await {
            Ok(()) => debug!(action = %log.action, entity_id = ?log.entity_id, "Audit entry recorded"),
            Err(e) => warn!(
                action = %log.action,
                entity_type = %log.entity_type,
                trace_id = ?log.trace_id,
                error = %e,
                "Failed to record audit entry"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::AuditLogFilter;
    use crate::infrastructure::persistence::InMemoryStore;
    use crate::presentation::middleware::error::AppError;
    use async_trait::async_trait;

    struct FailingRepository;

    #[async_trait]
    impl AuditLogRepository for FailingRepository {
        async fn insert(&self, _entry: &AuditLog) -> Result<(), AppError> {
            Err(AppError::ServiceUnavailable { message: "down".to_string() })
        }

        async fn list(&self, _filter: AuditLogFilter) -> Result<Vec<AuditLog>, AppError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_record_persists_entry() {
        let store = Arc::new(InMemoryStore::new());
        let logger = AuditLogger::new(store.clone());
        let tenant_id = TenantId::new();
        let actor_id = UserId::new();

        logger
            .record(
                AuditEntry::new("event.publish", "event")
                    .entity("evt-1")
                    .tenant(tenant_id)
                    .actor(actor_id)
                    .trace(Some("trace-abc"))
                    .metadata(json!({ "capacity": 12 })),
            )
            .await;

        let entries = store.list(AuditLogFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "event.publish");
        assert_eq!(entries[0].tenant_id, Some(tenant_id));
        assert_eq!(entries[0].actor_id, Some(actor_id));
        assert_eq!(entries[0].trace_id.as_deref(), Some("trace-abc"));
        assert_eq!(entries[0].metadata["capacity"], 12);
    }

    #[tokio::test]
    async fn test_record_swallows_failures() {
        let logger = AuditLogger::new(Arc::new(FailingRepository));
        logger.record(AuditEntry::new("user.login", "user")).await;
    }
}
