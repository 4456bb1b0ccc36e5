//! API endpoints.

mod auth;
mod blogs;
mod notifications;
mod reports;
mod users;
mod vets;

use axum::{Router, routing::get};
use paws_common::AppError;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Health check body.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> ApiResponse<HealthResponse> {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Create the API router. The server mounts it under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/reports", reports::router())
        .nest("/notifications", notifications::router())
        .nest("/vets", vets::router())
        .nest("/blogs", blogs::router())
        .fallback(not_found)
}
