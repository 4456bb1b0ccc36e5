//! User repository.

use std::sync::Arc;

use crate::entities::{
    User,
    user::{self, UserRole},
};
use paws_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users with `role` who are currently available, oldest account first.
    pub async fn find_available_by_role(&self, role: UserRole) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Role.eq(role))
            .filter(user::Column::IsAvailable.eq(true))
            .order_by_asc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Award a rescue: `points += points`, `rescue_count += 1` in one UPDATE.
    pub async fn increment_rescue_stats(&self, user_id: &str, points: i32) -> AppResult<()> {
        Self::increment_rescue_stats_in(self.db.as_ref(), user_id, points).await
    }

    /// [`Self::increment_rescue_stats`] on `conn`, usually an open transaction.
    pub async fn increment_rescue_stats_in<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
        points: i32,
    ) -> AppResult<()> {
        User::update_many()
            .col_expr(user::Column::Points, Expr::col(user::Column::Points).add(points))
            .col_expr(
                user::Column::RescueCount,
                Expr::col(user::Column::RescueCount).add(1),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            role,
            lat: 23.8103,
            lng: 90.4125,
            phone: None,
            is_available: true,
            points: 0,
            rescue_count: 0,
            clinic_name: None,
            specialization: None,
            experience: None,
            vet_availability: None,
            emergency_contact: None,
            website: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("user1", UserRole::Public);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id("user1").await.unwrap();

        assert_eq!(result.unwrap().id, "user1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = UserRepository::new(db);

        let result = repo.find_by_ids(&[]).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_available_by_role() {
        let r1 = create_test_user("r1", UserRole::Rescuer);
        let r2 = create_test_user("r2", UserRole::Rescuer);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_available_by_role(UserRole::Rescuer).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_increment_rescue_stats_is_single_update() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let db = Arc::new(mock);

        let repo = UserRepository::new(Arc::clone(&db));
        repo.increment_rescue_stats("r1", 10).await.unwrap();
        drop(repo);

        let conn = Arc::try_unwrap(db).ok().unwrap();
        let log = conn.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("UPDATE"), "{sql}");
        assert!(sql.contains("rescue_count"), "{sql}");
    }
}
