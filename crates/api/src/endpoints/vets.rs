//! Vet directory and vet case endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use paws_common::AppResult;
use paws_core::{AdoptionListingInput, TreatmentInput, VetContactInput};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AppJson, AppQuery, AuthUser},
    middleware::AppState,
    response::{self, ApiResponse, ReportResponse, VetResponse},
};

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Kilometres.
    pub radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasesParams {
    #[serde(default)]
    pub include_open: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub message: &'static str,
    pub vet_contact: VetResponse,
}

async fn nearby(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<NearbyParams>,
) -> AppResult<ApiResponse<Vec<VetResponse>>> {
    let vets = state
        .vet_service
        .nearby(params.lat, params.lng, params.radius)
        .await?;
    Ok(ApiResponse::ok(vets.into_iter().map(VetResponse::from).collect()))
}

async fn contact(
    State(state): State<AppState>,
    AppJson(req): AppJson<VetContactInput>,
) -> AppResult<ApiResponse<ContactResponse>> {
    let vet = state.vet_service.contact(req).await?;
    Ok(ApiResponse::ok(ContactResponse {
        message: "Vet has been notified",
        vet_contact: vet.into(),
    }))
}

async fn cases(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CasesParams>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let views = state.vet_service.cases(&user, params.include_open).await?;
    Ok(ApiResponse::ok(response::reports(views)))
}

async fn accept_case(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state.report_service.accept_vet_case(&user, &id).await?;
    Ok(ApiResponse::ok(view.into()))
}

async fn update_treatment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<TreatmentInput>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state
        .report_service
        .update_treatment(&user, &id, req)
        .await?;
    Ok(ApiResponse::ok(view.into()))
}

async fn post_for_adoption(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AdoptionListingInput>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state
        .report_service
        .post_for_adoption(&user, &id, req)
        .await?;
    Ok(ApiResponse::ok(view.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nearby", get(nearby))
        .route("/contact", post(contact))
        .route("/cases", get(cases))
        .route("/cases/{id}/accept", post(accept_case))
        .route("/cases/{id}/treatment", patch(update_treatment))
        .route("/cases/{id}/adoption", patch(post_for_adoption))
}
