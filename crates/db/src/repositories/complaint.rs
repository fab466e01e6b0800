//! Complaint repository.

use std::sync::Arc;

use crate::entities::{
    Complaint,
    complaint::{self, ComplaintCategory, ComplaintStatus, Priority},
};
use aduan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Complaint repository for database operations.
#[derive(Clone)]
pub struct ComplaintRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new complaint.
    pub async fn create(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a complaint by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        Complaint::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a complaint by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<complaint::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ComplaintNotFound(id.to_string()))
    }

    /// Write changed fields of a complaint.
    pub async fn update(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a complaint. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Complaint::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Complaints owned by a student, in store order.
    pub async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::StudentId.eq(student_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every complaint, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .order_by_desc(complaint::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaints matching every given criterion, newest first.
    pub async fn find_filtered(
        &self,
        status: Option<ComplaintStatus>,
        category: Option<ComplaintCategory>,
        priority: Option<Priority>,
    ) -> AppResult<Vec<complaint::Model>> {
        let mut query = Complaint::find().order_by_desc(complaint::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(complaint::Column::Status.eq(s));
        }
        if let Some(c) = category {
            query = query.filter(complaint::Column::Category.eq(c));
        }
        if let Some(p) = priority {
            query = query.filter(complaint::Column::Priority.eq(p));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count complaints in a status.
    pub async fn count_by_status(&self, status: ComplaintStatus) -> AppResult<u64> {
        Complaint::find()
            .filter(complaint::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_complaint(id: &str, student_id: &str) -> complaint::Model {
        let now = Utc::now();
        complaint::Model {
            id: id.to_string(),
            student_id: student_id.to_string(),
            student_name: "Aisyah".to_string(),
            student_email: "aisyah@pelajar.edu.my".to_string(),
            category: ComplaintCategory::Academic,
            title: "Jadual kuliah bertindih".to_string(),
            description: "Dua kuliah pada masa yang sama".to_string(),
            attachment_key: None,
            attachment_name: None,
            attachment_type: None,
            attachment_size: None,
            status: ComplaintStatus::New,
            priority: Priority::Low,
            admin_notes: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_found() {
        let complaint = create_test_complaint("ADU1", "student1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint.clone()]])
                .into_connection(),
        );

        let repo = ComplaintRepository::new(db);
        let result = repo.get_by_id("ADU1").await.unwrap();

        assert_eq!(result, complaint);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<complaint::Model>::new()])
                .into_connection(),
        );

        let repo = ComplaintRepository::new(db);
        let result = repo.get_by_id("ADU404").await;

        match result {
            Err(AppError::ComplaintNotFound(id)) => assert_eq!(id, "ADU404"),
            other => panic!("Expected ComplaintNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_complaint() {
        let complaint = create_test_complaint("ADU1", "student1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[complaint.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ComplaintRepository::new(db);
        let active = complaint::ActiveModel {
            id: Set("ADU1".to_string()),
            student_id: Set("student1".to_string()),
            ..Default::default()
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.id, "ADU1");
        assert_eq!(result.status, ComplaintStatus::New);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_a_row_was_removed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = ComplaintRepository::new(db);

        assert!(repo.delete("ADU1").await.unwrap());
        assert!(!repo.delete("ADU1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_student() {
        let c1 = create_test_complaint("ADU1", "student1");
        let c2 = create_test_complaint("ADU2", "student1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = ComplaintRepository::new(db);
        let result = repo.find_by_student("student1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|c| c.student_id == "student1"));
    }

    #[tokio::test]
    async fn test_find_filtered_builds_and_query() {
        let complaint = create_test_complaint("ADU1", "student1");

        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[complaint]])
            .into_connection();
        let db = Arc::new(mock);

        let repo = ComplaintRepository::new(db.clone());
        let result = repo
            .find_filtered(
                Some(ComplaintStatus::New),
                Some(ComplaintCategory::Academic),
                None,
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 1);

        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let logged = format!("{log:?}");
        assert!(logged.contains(" AND "));
        assert!(logged.contains("baru"));
        assert!(logged.contains("akademik"));
        assert!(!logged.contains("rendah"));
    }

    #[tokio::test]
    async fn test_count_by_status() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = ComplaintRepository::new(db);
        let count = repo.count_by_status(ComplaintStatus::Done).await.unwrap();

        assert_eq!(count, 3);
    }
}
