//! Notifications endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use paws_common::AppResult;
use serde::Deserialize;

use crate::{
    extractors::{AppQuery, AuthUser},
    middleware::AppState,
    response::{self, ApiResponse, CountResponse, MessageResponse, NotificationResponse},
};

/// List notifications request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsParams {
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
}

/// Get notifications for the authenticated user, newest first.
async fn get_notifications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListNotificationsParams>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .list(&user.id, params.unread_only)
        .await?;

    Ok(ApiResponse::ok(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state.notification_service.unread_count(&user.id).await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.notification_service.mark_read(&user.id, &id).await?;
    Ok(response::message("Notification marked as read"))
}

async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state.notification_service.mark_all_read(&user.id).await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_notifications))
        .route("/unread-count", get(unread_count))
        .route("/mark-all-read", post(mark_all_read))
        .route("/{id}/read", patch(mark_read))
}
