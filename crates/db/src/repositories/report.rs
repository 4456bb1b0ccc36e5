//! Report repository.

use std::sync::Arc;

use crate::entities::{
    Report,
    report::{self, IssueType, ReportStatus},
};
use paws_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

/// Filters for listing reports.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    /// Only reports in this status.
    pub status: Option<ReportStatus>,
    /// Only reports of this issue type.
    pub issue_type: Option<IssueType>,
    /// Only reports filed by this user.
    pub created_by: Option<String>,
}

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Start a transaction on the shared connection.
    ///
    /// Dropping the transaction without committing it rolls it back.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ReportNotFound(id.to_string()))
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update fields that do not take part in the lifecycle.
    ///
    /// Status changes must go through [`Self::update_if_status`].
    pub async fn update(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply `changes` to report `id` only while its status is one of `expected`.
    ///
    /// Runs as a single conditional `UPDATE`, so concurrent transitions from the
    /// same state have exactly one winner. Returns `false` when no row matched.
    /// `changes` must not set the primary key.
    pub async fn update_if_status(
        &self,
        id: &str,
        expected: &[ReportStatus],
        changes: report::ActiveModel,
    ) -> AppResult<bool> {
        Self::update_if_status_in(self.db.as_ref(), id, expected, changes).await
    }

    /// [`Self::update_if_status`] on `conn`, usually an open transaction.
    pub async fn update_if_status_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        expected: &[ReportStatus],
        changes: report::ActiveModel,
    ) -> AppResult<bool> {
        let result = Report::update_many()
            .set(changes)
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::Status.is_in(expected.iter().copied()))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// List reports, newest first.
    pub async fn find(&self, query: &ReportQuery) -> AppResult<Vec<report::Model>> {
        let mut select = Report::find();

        if let Some(status) = query.status {
            select = select.filter(report::Column::Status.eq(status));
        }
        if let Some(issue_type) = query.issue_type {
            select = select.filter(report::Column::IssueType.eq(issue_type));
        }
        if let Some(created_by) = &query.created_by {
            select = select.filter(report::Column::CreatedBy.eq(created_by.as_str()));
        }

        select
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every report, oldest first. Used by analytics.
    pub async fn find_all(&self) -> AppResult<Vec<report::Model>> {
        Report::find()
            .order_by_asc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Cases for a vet: those assigned to `vet_id`, plus, with `include_open`,
    /// unassigned cases still awaiting a vet.
    pub async fn find_vet_cases(
        &self,
        vet_id: &str,
        include_open: bool,
    ) -> AppResult<Vec<report::Model>> {
        let mut condition = Condition::any().add(report::Column::AssignedVet.eq(vet_id));

        if include_open {
            condition = condition
                .add(report::Column::Status.eq(ReportStatus::Pending))
                .add(
                    Condition::all()
                        .add(report::Column::Status.eq(ReportStatus::UnderTreatment))
                        .add(report::Column::AssignedVet.is_null()),
                );
        }

        Report::find()
            .filter(condition)
            .order_by_desc(report::Column::UpdatedAt)
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reports listed for adoption. With `decider`, only listings that user
    /// posted or rescued.
    pub async fn find_adoption_listings(
        &self,
        decider: Option<&str>,
    ) -> AppResult<Vec<report::Model>> {
        let mut select = Report::find().filter(report::Column::IsForAdoption.eq(true));

        if let Some(user_id) = decider {
            select = select.filter(
                Condition::any()
                    .add(report::Column::AdoptionPostedBy.eq(user_id))
                    .add(report::Column::AssignedTo.eq(user_id)),
            );
        }

        select
            .order_by_desc(report::Column::UpdatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn exec_result(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        match repo.get_by_id("missing").await {
            Err(AppError::ReportNotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("Expected ReportNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_if_status_reports_winner() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_result(1)])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let changes = report::ActiveModel {
            status: Set(ReportStatus::InProgress),
            assigned_to: Set(Some("rescuer1".to_string())),
            ..Default::default()
        };

        let won = repo
            .update_if_status("r1", &[ReportStatus::Pending], changes)
            .await
            .unwrap();
        assert!(won);
    }

    #[tokio::test]
    async fn test_update_if_status_reports_loser() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_result(0)])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let changes = report::ActiveModel {
            status: Set(ReportStatus::InProgress),
            ..Default::default()
        };

        let won = repo
            .update_if_status("r1", &[ReportStatus::Pending], changes)
            .await
            .unwrap();
        assert!(!won);
    }

    #[tokio::test]
    async fn test_find_with_filters() {
        let report = fixtures::report("r1", ReportStatus::Pending, Some("u1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let query = ReportQuery {
            status: Some(ReportStatus::Pending),
            created_by: Some("u1".to_string()),
            ..Default::default()
        };
        let result = repo.find(&query).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].created_by.as_deref(), Some("u1"));
    }
}
