//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use paws_core::{
    AdoptionService, AnalyticsService, BlogService, NotificationService, ReportService,
    UserService, VetService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub report_service: ReportService,
    pub adoption_service: AdoptionService,
    pub notification_service: NotificationService,
    pub analytics_service: AnalyticsService,
    pub vet_service: VetService,
    pub blog_service: BlogService,
}

/// Authentication middleware.
///
/// A valid bearer token puts the user into request extensions. Missing or
/// invalid tokens are not rejected here; [`crate::extractors::AuthUser`]
/// rejects on routes that need a user. A lookup that fails server-side ends
/// the request, so an outage never downgrades a caller to anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => {
                tracing::error!(error = %e, "Failed to authenticate bearer token");
                return e.into_response();
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring bearer token");
            }
        }
    }

    next.run(req).await
}
