//! Test utilities for database operations.
//!
//! Provides helpers for setting up and tearing down test databases.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use tracing::info;

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "paws_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "paws_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "paws_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Get URL for connecting to postgres database (for creating test DB).
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A test database context that manages the lifecycle of a test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
    #[allow(dead_code)]
    cleanup_on_drop: bool,
}

impl TestDatabase {
    /// Create a new test database with a unique name.
    ///
    /// This connects to the postgres database, creates a new test database,
    /// runs migrations, and returns a connection to the test database.
    pub async fn new() -> Result<Self, DbErr> {
        let config = TestDbConfig::default();
        Self::with_config(config).await
    }

    /// Create a new test database with custom configuration.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self {
            conn,
            config,
            cleanup_on_drop: false, // Set to true to clean tables on drop
        })
    }

    /// Create a unique test database (for parallel tests).
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let unique_suffix = uuid::Uuid::new_v4().to_string().replace('-', "_");
        config.database = format!("paws_test_{}", &unique_suffix[..8]);

        // Connect to postgres to create the database
        let postgres_conn = Database::connect(&config.postgres_url()).await?;

        let create_db = format!("CREATE DATABASE \"{}\"", config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, create_db))
            .await?;

        postgres_conn.close().await?;

        // Connect to the new database
        let conn = Database::connect(&config.database_url()).await?;

        info!(database = %config.database, "Created unique test database");

        Ok(Self {
            conn,
            config,
            cleanup_on_drop: true,
        })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Clean up all data in the test database (truncate all tables).
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        // Get all table names
        let tables = self
            .conn
            .query_all(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT tablename FROM pg_tables WHERE schemaname = 'public'".to_string(),
            ))
            .await?;

        // Truncate each table
        for row in tables {
            if let Ok(table_name) = row.try_get::<String>("", "tablename") {
                // Skip migration table
                if table_name == "seaql_migrations" {
                    continue;
                }

                let truncate = format!("TRUNCATE TABLE \"{table_name}\" CASCADE");
                self.conn
                    .execute(Statement::from_string(DatabaseBackend::Postgres, truncate))
                    .await?;
            }
        }

        info!("Cleaned up test database");
        Ok(())
    }

    /// Drop the test database (for unique databases).
    /// Note: This consumes self because it needs to close the connection.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        // Close the connection first
        self.conn.close().await?;

        // Connect to postgres to drop the database
        let postgres_conn = Database::connect(&self.config.postgres_url()).await?;

        // Terminate all connections to the database
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.config.database
        );
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, terminate))
            .await
            .ok(); // Ignore errors

        let drop_db = format!("DROP DATABASE IF EXISTS \"{}\"", self.config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, drop_db))
            .await?;

        postgres_conn.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }

    /// Run a test with automatic cleanup.
    ///
    /// Example:
    /// ```ignore
    /// TestDatabase::run_test(|db| async {
    ///     let conn = db.connection();
    ///     // use connection...
    ///     Ok(())
    /// }).await?;
    /// ```
    pub async fn run_test<F, Fut, T>(f: F) -> Result<T, DbErr>
    where
        F: for<'a> FnOnce(&'a Self) -> Fut,
        Fut: std::future::Future<Output = Result<T, DbErr>>,
    {
        let db = Self::new().await?;
        let result = f(&db).await;
        db.cleanup().await?;
        result
    }
}

/// Model builders shared by unit tests across the workspace.
///
/// Every builder returns a fully populated model with neutral defaults so
/// tests only spell out the fields they care about.
pub mod fixtures {
    use chrono::Utc;
    use serde_json::json;

    use crate::entities::{
        adoption_request::{self, AdoptionRequestStatus},
        blog::{self, BlogCategory},
        notification::{self, NotificationType},
        report::{self, InjurySeverity, IssueType, ReportStatus},
        user::{self, UserRole},
    };

    /// A user located at the default city centre.
    #[must_use]
    pub fn user(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            password_hash: String::new(),
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

    /// A report in `status`, optionally filed by `created_by`.
    #[must_use]
    pub fn report(id: &str, status: ReportStatus, created_by: Option<&str>) -> report::Model {
        report::Model {
            id: id.to_string(),
            photo_url: format!("https://img.example.com/{id}.jpg"),
            description: Some("Dog with an injured leg".to_string()),
            lat: 23.8103,
            lng: 90.4125,
            issue_type: IssueType::Injured,
            animal_type: Some("dog".to_string()),
            animal_name: None,
            injury_severity: InjurySeverity::Medium,
            first_aid_suggestions: json!([]),
            reporter_phone: None,
            reporter_email: None,
            status,
            created_by: created_by.map(str::to_string),
            assigned_to: None,
            assigned_vet: None,
            recovery_photo_url: None,
            health_info: None,
            vet_notes: None,
            treatment_plan: None,
            estimated_recovery_time: None,
            is_for_adoption: false,
            adoption_posted_by: None,
            adoption_contact_person: None,
            adoption_contact_phone: None,
            adoption_contact_email: None,
            adoption_location: None,
            adoption_fee: None,
            adoption_requirements: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    /// An adoption request from `applicant_id` on `report_id`.
    #[must_use]
    pub fn adoption_request(
        id: &str,
        report_id: &str,
        applicant_id: &str,
        status: AdoptionRequestStatus,
    ) -> adoption_request::Model {
        adoption_request::Model {
            id: id.to_string(),
            report_id: report_id.to_string(),
            applicant_id: applicant_id.to_string(),
            applicant_name: format!("User {applicant_id}"),
            message: "I have a large garden".to_string(),
            contact_phone: "01700000000".to_string(),
            contact_email: format!("{applicant_id}@example.com"),
            status,
            response_message: None,
            created_at: Utc::now().into(),
            responded_at: None,
        }
    }

    /// An unread system notification for `user_id`.
    #[must_use]
    pub fn notification(id: &str, user_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Hello".to_string(),
            message: "Welcome".to_string(),
            notification_type: NotificationType::System,
            related_report_id: None,
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    /// A published blog post by `author_id`.
    #[must_use]
    pub fn blog(id: &str, author_id: &str) -> blog::Model {
        blog::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "Keeping strays cool in summer".to_string(),
            content: "Leave out a bowl of fresh water.".to_string(),
            excerpt: "Leave out a bowl of fresh water.".to_string(),
            category: BlogCategory::SafetyTips,
            image_url: None,
            is_published: true,
            views: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }
}
