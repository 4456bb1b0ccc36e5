//! Report, adoption and analytics endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use paws_common::{AppError, AppResult};
use paws_core::{
    AdoptionDecisionInput, AdoptionListingInput, AdoptionRequestInput, CreateReportInput,
    Dashboard, TriageSuggestion, triage,
};
use paws_db::{
    entities::report::{IssueType, ReportStatus},
    repositories::ReportQuery,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AppJson, AppQuery, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, AdoptionRequestResponse, ApiResponse, ReportResponse},
};

/// List filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsParams {
    /// Status name; `All` or empty means any.
    pub status: Option<String>,
    pub issue_type: Option<IssueType>,
    /// Embed creator, rescuer and vet.
    #[serde(default)]
    pub with_users: bool,
}

impl ListReportsParams {
    fn into_query(self) -> AppResult<ReportQuery> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("" | "All" | "all") => None,
            Some(s) => Some(
                ReportStatus::parse(s)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {s}")))?,
            ),
        };

        Ok(ReportQuery {
            status,
            issue_type: self.issue_type,
            created_by: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoveryPhotoRequest {
    #[serde(rename = "recoveryPhotoURL", alias = "recoveryPhotoUrl")]
    pub recovery_photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeImageRequest {
    #[serde(rename = "imageUrl", alias = "imageURL")]
    pub image_url: Option<String>,
}

/// Adoption request created.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequestCreated {
    pub message: &'static str,
    pub adoption_request: AdoptionRequestResponse,
}

async fn create_report(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateReportInput>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state.report_service.create(user.as_ref(), req).await?;
    Ok(ApiResponse::created(view.into()))
}

async fn list_reports(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListReportsParams>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let with_users = params.with_users;
    let query = params.into_query()?;
    let views = state.report_service.list(&query, with_users).await?;
    Ok(ApiResponse::ok(response::reports(views)))
}

async fn my_reports(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let views = state.report_service.my_reports(&user).await?;
    Ok(ApiResponse::ok(response::reports(views)))
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state.report_service.get_with_people(&id).await?;
    Ok(ApiResponse::ok(view.into()))
}

async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateStatusRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state
        .report_service
        .update_status(&user, &id, &req.status)
        .await?;
    Ok(ApiResponse::ok(view.into()))
}

async fn upload_recovery_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<RecoveryPhotoRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state
        .report_service
        .upload_recovery_photo(&user, &id, req.recovery_photo_url)
        .await?;
    Ok(ApiResponse::ok(view.into()))
}

async fn accept_rescue(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state.report_service.accept_rescue(&user, &id).await?;
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

async fn request_adoption(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AdoptionRequestInput>,
) -> AppResult<ApiResponse<AdoptionRequestCreated>> {
    let request = state.adoption_service.request(&user, &id, req).await?;
    Ok(ApiResponse::ok(AdoptionRequestCreated {
        message: "Adoption request submitted successfully",
        adoption_request: request.into(),
    }))
}

async fn manageable_adoptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ReportResponse>>> {
    let views = state.adoption_service.manageable(&user).await?;
    Ok(ApiResponse::ok(response::reports(views)))
}

async fn decide_adoption(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, request_id)): Path<(String, String)>,
    AppJson(req): AppJson<AdoptionDecisionInput>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let view = state
        .adoption_service
        .decide(&user, &id, &request_id, req)
        .await?;
    Ok(ApiResponse::ok(view.into()))
}

async fn analyze_image(
    AppJson(req): AppJson<AnalyzeImageRequest>,
) -> AppResult<ApiResponse<TriageSuggestion>> {
    let suggestion = triage::analyze(req.image_url.as_deref())?;
    Ok(ApiResponse::ok(suggestion))
}

async fn dashboard(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Dashboard>> {
    let dashboard = state.analytics_service.dashboard(&user).await?;
    Ok(ApiResponse::ok(dashboard))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route("/my-reports", get(my_reports))
        .route("/analyze-image", post(analyze_image))
        .route("/analytics/dashboard", get(dashboard))
        .route("/admin/adoptions", get(manageable_adoptions))
        .route("/recovery/{id}", patch(upload_recovery_photo))
        .route("/{id}", get(get_report).patch(update_status))
        .route("/{id}/accept", post(accept_rescue))
        .route("/{id}/post-adoption", post(post_for_adoption))
        .route("/{id}/adopt", post(request_adoption))
        .route("/{id}/adoptions/{request_id}", patch(decide_adoption))
}
