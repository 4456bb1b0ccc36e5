//! Current-user endpoints.

use axum::{Router, extract::State, routing::get};
use paws_common::AppResult;
use paws_core::UpdateProfileInput;

use crate::{
    extractors::{AppJson, AuthUser},
    middleware::AppState,
    response::{ApiResponse, UserResponse},
};

async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.update_profile(&user, req).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me).patch(update_me))
}
