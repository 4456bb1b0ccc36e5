//! HTTP API layer for PAWS.
//!
//! This crate provides the REST surface mounted under `/api`:
//!
//! - **Endpoints**: auth, users, reports and adoptions, notifications, vets, blogs
//! - **Extractors**: bearer-token authentication, JSON and query parsing with API error bodies
//! - **Middleware**: application state and the auth layer
//! - **Responses**: camelCase DTOs and the JSON error body
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
