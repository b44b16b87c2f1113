use std::sync::Arc;

use crate::{
    application::dto::{AuditLogDto, AuditLogQuery},
    domain::repositories::AuditLogRepository,
    presentation::middleware::error::AppError,
};

/// Use case for browsing the audit trail
pub struct ListAuditLogsUseCase {
    audit_logs: Arc<dyn AuditLogRepository>,
}

impl ListAuditLogsUseCase {
    pub fn new(audit_logs: Arc<dyn AuditLogRepository>) -> Self {
        Self { audit_logs }
    }

    pub async fn execute(&self, query: AuditLogQuery) -> Result<Vec<AuditLogDto>, AppError> {
        let entries = self.audit_logs.list(query.into()).await?;
        Ok(entries.into_iter().map(AuditLogDto::from).collect())
    }
}
