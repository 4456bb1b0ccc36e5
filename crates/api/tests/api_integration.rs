//! API integration tests.
//!
//! These drive the full router, including the auth layer, against mock
//! databases.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
};
use paws_api::{AppState, auth_middleware, router as api_router};
use paws_common::config::AuthConfig;
use paws_core::{
    AdoptionService, AnalyticsService, BlogService, NotificationService, ReportService,
    TokenService, UserService, VetService,
};
use paws_db::{
    entities::{
        adoption_request::{self, AdoptionRequestStatus},
        report::{self, ReportStatus},
        user::{self, UserRole},
    },
    repositories::{
        AdoptionRequestRepository, BlogRepository, NotificationRepository, ReportRepository,
        UserRepository,
    },
    test_utils::fixtures,
};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret-that-is-long-enough";

/// One mock per repository, so each test queues exactly the rows it needs.
#[derive(Default)]
struct Mocks {
    users: Vec<Vec<user::Model>>,
    reports: Vec<Vec<report::Model>>,
    report_execs: Vec<u64>,
    requests: Vec<Vec<adoption_request::Model>>,
    notifications: usize,
    /// Fail the first user lookup, as during a database outage.
    users_down: bool,
}

fn mock() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn execs(db: MockDatabase, rows: &[u64]) -> MockDatabase {
    db.append_exec_results(rows.iter().map(|&rows_affected| MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }))
}

fn tokens() -> TokenService {
    TokenService::new(&AuthConfig {
        jwt_secret: SECRET.to_string(),
        token_ttl_secs: 3600,
    })
}

fn token_for(user: &user::Model) -> String {
    tokens().issue(user).unwrap()
}

/// Create the test router.
fn create_test_router(mocks: Mocks) -> Router {
    let mut users = mock().append_query_results(mocks.users);
    if mocks.users_down {
        users = users.append_query_errors([DbErr::Custom("connection refused".to_string())]);
    }
    let users = Arc::new(users.into_connection());
    let reports = Arc::new(
        execs(
            mock().append_query_results(mocks.reports),
            &mocks.report_execs,
        )
        .into_connection(),
    );
    let requests = Arc::new(mock().append_query_results(mocks.requests).into_connection());
    let notification_rows: Vec<Vec<_>> = (0..mocks.notifications)
        .map(|i| vec![fixtures::notification(&format!("n{i}"), "someone")])
        .collect();
    let notifications =
        Arc::new(mock().append_query_results(notification_rows).into_connection());
    let blogs = Arc::new(mock().into_connection());

    let user_repo = UserRepository::new(users);
    let report_repo = ReportRepository::new(reports);
    let adoption_repo = AdoptionRequestRepository::new(requests);
    let notification_service =
        NotificationService::new(NotificationRepository::new(notifications), 50);

    let state = AppState {
        user_service: UserService::new(user_repo.clone(), tokens()),
        report_service: ReportService::new(
            report_repo.clone(),
            adoption_repo.clone(),
            user_repo.clone(),
            notification_service.clone(),
            10,
        ),
        adoption_service: AdoptionService::new(
            report_repo.clone(),
            adoption_repo.clone(),
            notification_service.clone(),
        ),
        notification_service: notification_service.clone(),
        analytics_service: AnalyticsService::new(report_repo.clone(), user_repo.clone(), 5),
        vet_service: VetService::new(
            user_repo.clone(),
            report_repo,
            adoption_repo,
            notification_service,
            10.0,
        ),
        blog_service: BlogService::new(BlogRepository::new(blogs), user_repo),
    };

    api_router()
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn listed_report() -> report::Model {
    let mut report = fixtures::report("r1", ReportStatus::ReadyForAdoption, Some("u1"));
    report.assigned_to = Some("a".to_string());
    report.is_for_adoption = true;
    report.adoption_posted_by = Some("a".to_string());
    report.adoption_contact_phone = Some("555".to_string());
    report.adoption_contact_email = Some("a@x.com".to_string());
    report
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router(Mocks::default());

    let (status, body) = send(app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(Mocks::default());

    let (status, body) = send(app, get("/nonexistent/endpoint", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = create_test_router(Mocks::default());

    let (status, body) = send(app, get("/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_with_token() {
    let user = fixtures::user("u1", UserRole::Rescuer);
    let token = token_for(&user);
    let app = create_test_router(Mocks {
        users: vec![vec![user]],
        ..Default::default()
    });

    let (status, body) = send(app, get("/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "u1");
    assert_eq!(body["role"], "rescuer");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_token_lookup_outage_is_server_error() {
    let user = fixtures::user("u1", UserRole::Rescuer);
    let token = token_for(&user);
    let app = create_test_router(Mocks {
        users_down: true,
        ..Default::default()
    });

    // Without a user this would be filed anonymously and fail validation with 400.
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/reports",
            Some(&token),
            &json!({"lat": 10.0, "lng": 20.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = create_test_router(Mocks::default());

    let (status, _) = send(app, get("/users/me", Some("not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = create_test_router(Mocks {
        users: vec![vec![]],
        ..Default::default()
    });

    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({"email": "nobody@example.com", "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_report_requires_photo() {
    let app = create_test_router(Mocks::default());

    let (status, body) = send(
        app,
        json_request("POST", "/reports", None, &json!({"lat": 10.0, "lng": 20.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_list_reports() {
    let app = create_test_router(Mocks {
        reports: vec![vec![fixtures::report("r1", ReportStatus::Pending, None)]],
        requests: vec![vec![]],
        ..Default::default()
    });

    let (status, body) = send(app, get("/reports?status=Pending", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["status"], "Pending");
    assert!(body[0]["adoptionInfo"].is_null());
}

#[tokio::test]
async fn test_list_reports_rejects_unknown_status() {
    let app = create_test_router(Mocks::default());

    let (status, _) = send(app, get("/reports?status=Rescued", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_accept_requires_rescuer_role() {
    let user = fixtures::user("p1", UserRole::Public);
    let token = token_for(&user);
    let app = create_test_router(Mocks {
        users: vec![vec![user]],
        ..Default::default()
    });

    let (status, body) = send(
        app,
        json_request("POST", "/reports/r1/accept", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_second_accept_is_invalid_transition() {
    let mut in_progress = fixtures::report("r1", ReportStatus::InProgress, None);
    in_progress.assigned_to = Some("a".to_string());
    let rescuer = fixtures::user("c", UserRole::Rescuer);
    let token = token_for(&rescuer);

    let app = create_test_router(Mocks {
        users: vec![vec![rescuer]],
        reports: vec![vec![in_progress]],
        ..Default::default()
    });

    let (status, body) = send(
        app,
        json_request("POST", "/reports/r1/accept", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_missing_report_is_404() {
    let rescuer = fixtures::user("c", UserRole::Rescuer);
    let token = token_for(&rescuer);
    let app = create_test_router(Mocks {
        users: vec![vec![rescuer]],
        reports: vec![vec![]],
        ..Default::default()
    });

    let (status, body) = send(
        app,
        json_request("POST", "/reports/missing/accept", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Report not found");
}

#[tokio::test]
async fn test_request_adoption() {
    let applicant = fixtures::user("b", UserRole::Public);
    let token = token_for(&applicant);
    let created = fixtures::adoption_request("ar1", "r1", "b", AdoptionRequestStatus::Pending);

    let app = create_test_router(Mocks {
        users: vec![vec![applicant]],
        reports: vec![vec![listed_report()]],
        requests: vec![vec![], vec![created]],
        notifications: 1,
        ..Default::default()
    });

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/reports/r1/adopt",
            Some(&token),
            &json!({"message": "please", "contactInfo": {"phone": "1", "email": "b@x.com"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["adoptionRequest"]["status"], "Pending");
    assert_eq!(body["adoptionRequest"]["userId"], "b");
}

#[tokio::test]
async fn test_request_adoption_missing_contact_info() {
    let applicant = fixtures::user("b", UserRole::Public);
    let token = token_for(&applicant);
    let app = create_test_router(Mocks {
        users: vec![vec![applicant]],
        ..Default::default()
    });

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/reports/r1/adopt",
            Some(&token),
            &json!({"message": "please"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("contactInfo"));
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = create_test_router(Mocks::default());

    let request = Request::builder()
        .uri("/auth/login")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_approve_adoption() {
    let rescuer = fixtures::user("a", UserRole::Rescuer);
    let token = token_for(&rescuer);
    let pending = fixtures::adoption_request("ar1", "r1", "b", AdoptionRequestStatus::Pending);
    let mut approved = pending.clone();
    approved.status = AdoptionRequestStatus::Approved;
    let mut adopted = listed_report();
    adopted.status = ReportStatus::Adopted;

    let app = create_test_router(Mocks {
        users: vec![vec![rescuer]],
        reports: vec![vec![listed_report()], vec![adopted]],
        // Report and request swaps share one transaction on the report connection.
        report_execs: vec![1, 1],
        requests: vec![vec![pending], vec![approved]],
        notifications: 1,
        ..Default::default()
    });

    let (status, body) = send(
        app,
        json_request(
            "PATCH",
            "/reports/r1/adoptions/ar1",
            Some(&token),
            &json!({"status": "Approved", "responseMessage": "Welcome home"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Adopted");
    assert_eq!(body["adoptionRequests"][0]["status"], "Approved");
    assert_eq!(body["adoptionInfo"]["postedBy"], "a");
}

#[tokio::test]
async fn test_analyze_image() {
    let app = create_test_router(Mocks::default());

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/reports/analyze-image",
            None,
            &json!({"imageUrl": "https://img.example.com/dog.jpg"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.6..=0.95).contains(&confidence));
}

#[tokio::test]
async fn test_dashboard_is_admin_only() {
    let rescuer = fixtures::user("a", UserRole::Rescuer);
    let token = token_for(&rescuer);
    let app = create_test_router(Mocks {
        users: vec![vec![rescuer]],
        ..Default::default()
    });

    let (status, _) = send(app, get("/reports/analytics/dashboard", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_nearby_vets_requires_coordinates() {
    let app = create_test_router(Mocks::default());

    let (status, _) = send(app, get("/vets/nearby?lat=23.8", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notifications_require_auth() {
    let app = create_test_router(Mocks::default());

    let (status, _) = send(app, get("/notifications", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
