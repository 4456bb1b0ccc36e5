//! Authentication endpoints.

use axum::{Router, extract::State, routing::post};
use paws_common::AppResult;
use paws_core::{AuthSession, LoginInput, RegisterInput};
use serde::Serialize;

use crate::{
    extractors::AppJson,
    middleware::AppState,
    response::{ApiResponse, UserResponse},
};

/// Session response.
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.user_service.register(req).await?;
    Ok(ApiResponse::created(session.into()))
}

/// Sign in to an existing account.
async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.user_service.login(req).await?;
    Ok(ApiResponse::ok(session.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
