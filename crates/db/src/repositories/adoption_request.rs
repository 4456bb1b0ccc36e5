//! Adoption request repository.

use std::sync::Arc;

use crate::entities::{
    AdoptionRequest,
    adoption_request::{self, AdoptionRequestStatus},
};
use paws_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Adoption request repository for database operations.
#[derive(Clone)]
pub struct AdoptionRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl AdoptionRequestRepository {
    /// Create a new adoption request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a request by ID within a report.
    pub async fn find_in_report(
        &self,
        report_id: &str,
        id: &str,
    ) -> AppResult<Option<adoption_request::Model>> {
        AdoptionRequest::find_by_id(id)
            .filter(adoption_request::Column::ReportId.eq(report_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests on a report, oldest first.
    pub async fn find_by_report(&self, report_id: &str) -> AppResult<Vec<adoption_request::Model>> {
        AdoptionRequest::find()
            .filter(adoption_request::Column::ReportId.eq(report_id))
            .order_by_asc(adoption_request::Column::CreatedAt)
            .order_by_asc(adoption_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests on any of `report_ids`, oldest first.
    pub async fn find_by_reports(
        &self,
        report_ids: &[String],
    ) -> AppResult<Vec<adoption_request::Model>> {
        if report_ids.is_empty() {
            return Ok(vec![]);
        }

        AdoptionRequest::find()
            .filter(adoption_request::Column::ReportId.is_in(report_ids.to_vec()))
            .order_by_asc(adoption_request::Column::CreatedAt)
            .order_by_asc(adoption_request::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The applicant's pending or approved request on a report, if any.
    pub async fn find_active_by_applicant(
        &self,
        report_id: &str,
        applicant_id: &str,
    ) -> AppResult<Option<adoption_request::Model>> {
        AdoptionRequest::find()
            .filter(adoption_request::Column::ReportId.eq(report_id))
            .filter(adoption_request::Column::ApplicantId.eq(applicant_id))
            .filter(adoption_request::Column::Status.is_in([
                AdoptionRequestStatus::Pending,
                AdoptionRequestStatus::Approved,
            ]))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new request.
    pub async fn create(
        &self,
        model: adoption_request::ActiveModel,
    ) -> AppResult<adoption_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply `changes` to request `id` only while it is still pending.
    ///
    /// Returns `false` when the request was decided concurrently.
    pub async fn update_if_pending(
        &self,
        id: &str,
        changes: adoption_request::ActiveModel,
    ) -> AppResult<bool> {
        Self::update_if_pending_in(self.db.as_ref(), id, changes).await
    }

    /// [`Self::update_if_pending`] on `conn`, usually an open transaction.
    pub async fn update_if_pending_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        changes: adoption_request::ActiveModel,
    ) -> AppResult<bool> {
        let result = AdoptionRequest::update_many()
            .set(changes)
            .filter(adoption_request::Column::Id.eq(id))
            .filter(adoption_request::Column::Status.eq(AdoptionRequestStatus::Pending))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_active_by_applicant() {
        let request = fixtures::adoption_request("a1", "r1", "u2", AdoptionRequestStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request]])
                .into_connection(),
        );

        let repo = AdoptionRequestRepository::new(db);
        let found = repo.find_active_by_applicant("r1", "u2").await.unwrap();
        assert_eq!(found.unwrap().id, "a1");
    }

    #[tokio::test]
    async fn test_find_by_reports_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = AdoptionRequestRepository::new(db);
        assert!(repo.find_by_reports(&[]).await.unwrap().is_empty());
    }
}
