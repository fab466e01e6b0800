//! Audit trail for privileged and state-changing actions.

use std::fmt;

use aduan_common::{AppResult, IdGenerator};
use aduan_db::{entities::audit_log, repositories::AuditLogRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::policy::{Caller, authorize_admin};

/// Recorded action labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    UserRegistered,
    ComplaintCreated,
    ComplaintEdited,
    ComplaintDeleted,
    StatusAdvanced,
    PriorityChanged,
    AdminNotesUpdated,
    FeedbackAdded,
}

impl AuditAction {
    /// Stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserRegistered => "user.registered",
            Self::ComplaintCreated => "complaint.created",
            Self::ComplaintEdited => "complaint.edited",
            Self::ComplaintDeleted => "complaint.deleted",
            Self::StatusAdvanced => "complaint.status_advanced",
            Self::PriorityChanged => "complaint.priority_changed",
            Self::AdminNotesUpdated => "complaint.admin_notes_updated",
            Self::FeedbackAdded => "feedback.added",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit sink.
#[derive(Clone)]
pub struct AuditService {
    audit_repo: AuditLogRepository,
    id_gen: IdGenerator,
}

impl AuditService {
    /// Create a new audit service.
    #[must_use]
    pub const fn new(audit_repo: AuditLogRepository) -> Self {
        Self {
            audit_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append an entry. Store failures are logged and swallowed.
    pub async fn record(&self, action: AuditAction, actor_id: &str, details: impl Into<String>) {
        let model = audit_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            action: Set(action.as_str().to_string()),
            actor_id: Set(actor_id.to_string()),
            details: Set(details.into()),
            created_at: Set(chrono::Utc::now().into()),
        };

        if let Err(e) = self.audit_repo.create(model).await {
            warn!(error = %e, action = %action, actor_id, "Failed to write audit entry");
        }
    }

    /// Most recent entries, newest first. Admin only.
    pub async fn list_recent(
        &self,
        caller: &Caller,
        limit: u64,
    ) -> AppResult<Vec<audit_log::Model>> {
        authorize_admin(caller)?;
        self.audit_repo.find_recent(limit.min(500)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::policy::tests::{admin, student};
    use aduan_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_record_swallows_store_errors() {
        // No queued results: the insert fails inside the mock.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = AuditService::new(AuditLogRepository::new(db));

        service
            .record(AuditAction::ComplaintDeleted, "admin1", "ADU1")
            .await;
    }

    #[tokio::test]
    async fn test_record_writes_label() {
        let entry = audit_log::Model {
            id: "log1".to_string(),
            action: "complaint.deleted".to_string(),
            actor_id: "admin1".to_string(),
            details: "ADU1".to_string(),
            created_at: chrono::Utc::now().into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry]])
                .into_connection(),
        );
        let service = AuditService::new(AuditLogRepository::new(db.clone()));

        service
            .record(AuditAction::ComplaintDeleted, "admin1", "ADU1")
            .await;
        drop(service);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert!(format!("{log:?}").contains("complaint.deleted"));
    }

    #[tokio::test]
    async fn test_list_recent_requires_admin() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = AuditService::new(AuditLogRepository::new(db));

        let result = service.list_recent(&student("s1"), 10).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_recent_for_admin() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<audit_log::Model>::new()])
                .into_connection(),
        );
        let service = AuditService::new(AuditLogRepository::new(db));

        let result = service.list_recent(&admin(), 10).await.unwrap();
        assert!(result.is_empty());
    }
}
