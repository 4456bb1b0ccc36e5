//! Notification service.

use chrono::Utc;
use paws_common::{AppError, AppResult, IdGenerator};
use paws_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
    list_limit: u64,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, list_limit: u64) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
            list_limit,
        }
    }

    fn build(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        notification_type: NotificationType,
        report_id: Option<&str>,
    ) -> notification::ActiveModel {
        notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            notification_type: Set(notification_type),
            related_report_id: Set(report_id.map(str::to_string)),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        }
    }

    /// Create one notification for `user_id`.
    pub async fn notify(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        notification_type: NotificationType,
        report_id: Option<&str>,
    ) -> AppResult<notification::Model> {
        let model = self.build(user_id, title, message, notification_type, report_id);
        self.notification_repo.create(model).await
    }

    /// Like [`Self::notify`], but a failure is logged and swallowed.
    ///
    /// Used for side effects of lifecycle transitions, which must not fail
    /// once the transition itself has been written.
    pub async fn try_notify(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        notification_type: NotificationType,
        report_id: Option<&str>,
    ) {
        if let Err(e) = self
            .notify(user_id, title, message, notification_type, report_id)
            .await
        {
            tracing::warn!(
                error = %e,
                user_id = %user_id,
                title = %title,
                "Failed to create notification"
            );
        }
    }

    /// Send the same notification to every user in `user_ids`.
    ///
    /// Returns the number of notifications written.
    pub async fn fan_out(
        &self,
        user_ids: &[String],
        title: &str,
        message: &str,
        notification_type: NotificationType,
        report_id: Option<&str>,
    ) -> AppResult<u64> {
        let models = user_ids
            .iter()
            .map(|user_id| self.build(user_id, title, message, notification_type, report_id))
            .collect();
        self.notification_repo.create_many(models).await
    }

    /// Latest notifications for a user, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_user(user_id, self.list_limit, unread_only)
            .await
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if notification.user_id != user_id {
            return Err(AppError::Forbidden(
                "Not the recipient of this notification".to_string(),
            ));
        }

        if notification.is_read {
            return Ok(());
        }

        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark all of the user's notifications as read.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use paws_db::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> NotificationService {
        NotificationService::new(NotificationRepository::new(Arc::new(db.into_connection())), 50)
    }

    #[tokio::test]
    async fn test_notify_returns_created_row() {
        let mut created = fixtures::notification("n1", "u1");
        created.notification_type = NotificationType::RescueAssigned;
        created.title = "Rescue Mission Accepted".to_string();

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[created.clone()]]),
        );

        let result = service
            .notify(
                "u1",
                "Rescue Mission Accepted",
                "You accepted a rescue",
                NotificationType::RescueAssigned,
                Some("r1"),
            )
            .await
            .unwrap();

        assert_eq!(result.user_id, "u1");
        assert_eq!(result.notification_type, NotificationType::RescueAssigned);
    }

    #[tokio::test]
    async fn test_try_notify_swallows_errors() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([sea_orm::DbErr::Custom("down".to_string())]),
        );

        // Must not panic or propagate.
        service
            .try_notify("u1", "t", "m", NotificationType::System, None)
            .await;
    }

    #[tokio::test]
    async fn test_fan_out_writes_one_row_per_recipient() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            },
        ]));

        let recipients = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let written = service
            .fan_out(
                &recipients,
                "New Animal Rescue Request",
                "A new animal needs rescue in your area",
                NotificationType::NewReport,
                Some("r1"),
            )
            .await
            .unwrap();

        assert_eq!(written, 3);
    }

    #[tokio::test]
    async fn test_fan_out_without_recipients_skips_database() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let written = service
            .fan_out(&[], "t", "m", NotificationType::NewReport, None)
            .await
            .unwrap();

        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_mark_read_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()]),
        );

        let result = service.mark_read("u1", "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_read_rejects_other_recipient() {
        let notification = fixtures::notification("n1", "owner");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[notification]]),
        );

        let result = service.mark_read("intruder", "n1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mark_read_updates_own_notification() {
        let notification = fixtures::notification("n1", "u1");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[notification]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
        );

        assert!(service.mark_read("u1", "n1").await.is_ok());
    }
}
