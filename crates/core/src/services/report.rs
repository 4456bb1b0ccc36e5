//! Report service: filing reports and driving the rescue lifecycle.

use std::collections::HashMap;

use chrono::Utc;
use paws_common::{AppError, AppResult, GeoPoint, IdGenerator};
use paws_db::{
    entities::{
        adoption_request,
        notification::NotificationType,
        report::{self, ContactPerson, InjurySeverity, IssueType, ReportStatus},
        user::{self, UserRole},
    },
    repositories::{AdoptionRequestRepository, ReportQuery, ReportRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::{
    lifecycle::{
        self, ADOPTION_LISTING_FROM, REPORTER_ROLES, RESCUE_FROM, RESCUER_ROLES, VET_CASE_FROM,
        VET_ROLES,
    },
    notification::NotificationService,
    user::non_empty,
};

/// A report with its adoption requests and, optionally, the users it names.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub report: report::Model,
    /// Oldest first.
    pub adoption_requests: Vec<adoption_request::Model>,
    /// Creator, rescuer and vet keyed by id. Empty unless requested.
    pub people: HashMap<String, user::Model>,
}

impl ReportView {
    /// Look up one of the users named by the report.
    #[must_use]
    pub fn person(&self, id: Option<&str>) -> Option<&user::Model> {
        id.and_then(|id| self.people.get(id))
    }
}

/// Input for filing a report.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportInput {
    #[serde(rename = "photoURL", alias = "photoUrl")]
    #[validate(length(max = 2048))]
    pub photo_url: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub lat: Option<f64>,
    pub lng: Option<f64>,

    pub issue_type: Option<IssueType>,

    #[validate(length(max = 64))]
    pub animal_type: Option<String>,

    #[validate(length(max = 128))]
    pub animal_name: Option<String>,

    pub injury_severity: Option<InjurySeverity>,

    /// Usually copied from an image triage suggestion.
    #[serde(default)]
    pub first_aid_suggestions: Vec<String>,

    #[validate(nested)]
    pub reporter_contact: Option<ReporterContact>,
}

/// How the reporter can be reached.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReporterContact {
    #[validate(length(max = 32))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,
}

/// Treatment record fields. Empty values leave the stored value alone.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentInput {
    #[validate(length(max = 5000))]
    pub vet_notes: Option<String>,

    #[validate(length(max = 5000))]
    pub treatment_plan: Option<String>,

    #[validate(length(max = 128))]
    pub estimated_recovery_time: Option<String>,

    #[validate(length(max = 5000))]
    pub health_info: Option<String>,
}

/// Adoption listing published by post-for-adoption.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionListingInput {
    /// Defaults to `vet` when a vet is assigned, otherwise `reporter`.
    pub contact_person: Option<ContactPerson>,

    #[serde(alias = "phone")]
    #[validate(length(min = 1, max = 32))]
    pub contact_phone: String,

    #[serde(alias = "email")]
    #[validate(email)]
    pub contact_email: String,

    #[validate(length(max = 512))]
    pub location: Option<String>,

    #[serde(alias = "fee")]
    #[validate(range(min = 0.0))]
    pub adoption_fee: Option<f64>,

    #[validate(length(max = 5000))]
    pub requirements: Option<String>,
}

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    adoption_repo: AdoptionRequestRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
    points_per_rescue: i32,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        adoption_repo: AdoptionRequestRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
        points_per_rescue: i32,
    ) -> Self {
        Self {
            report_repo,
            adoption_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
            points_per_rescue,
        }
    }

    /// File a new report and alert every available rescuer.
    pub async fn create(
        &self,
        creator: Option<&user::Model>,
        input: CreateReportInput,
    ) -> AppResult<ReportView> {
        if let Some(creator) = creator {
            creator.require_role(REPORTER_ROLES)?;
        }
        input.validate()?;

        let photo_url = non_empty(input.photo_url);
        let (Some(photo_url), Some(lat), Some(lng)) = (photo_url, input.lat, input.lng) else {
            return Err(AppError::BadRequest(
                "Photo URL, latitude and longitude are required".to_string(),
            ));
        };
        let location = GeoPoint::new(lat, lng)
            .ok_or_else(|| AppError::BadRequest("Coordinates out of range".to_string()))?;

        let contact = input.reporter_contact.unwrap_or_default();
        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            photo_url: Set(photo_url),
            description: Set(non_empty(input.description)),
            lat: Set(location.lat),
            lng: Set(location.lng),
            issue_type: Set(input.issue_type.unwrap_or_default()),
            animal_type: Set(non_empty(input.animal_type)),
            animal_name: Set(non_empty(input.animal_name)),
            injury_severity: Set(input.injury_severity.unwrap_or_default()),
            first_aid_suggestions: Set(serde_json::json!(input.first_aid_suggestions)),
            reporter_phone: Set(non_empty(contact.phone)),
            reporter_email: Set(non_empty(contact.email)),
            status: Set(ReportStatus::Pending),
            created_by: Set(creator.map(|u| u.id.clone())),
            is_for_adoption: Set(false),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let report = self.report_repo.create(model).await?;
        tracing::info!(
            report_id = %report.id,
            created_by = ?report.created_by,
            "Report filed"
        );

        self.alert_rescuers(&report.id).await;

        Ok(ReportView {
            report,
            adoption_requests: vec![],
            people: HashMap::new(),
        })
    }

    async fn alert_rescuers(&self, report_id: &str) {
        let rescuers = match self.user_repo.find_available_by_role(UserRole::Rescuer).await {
            Ok(rescuers) => rescuers,
            Err(e) => {
                tracing::warn!(error = %e, report_id = %report_id, "Failed to load rescuers");
                return;
            }
        };

        let ids: Vec<String> = rescuers.into_iter().map(|u| u.id).collect();
        match self
            .notifications
            .fan_out(
                &ids,
                "New Animal Rescue Request",
                "A new animal needs rescue in your area",
                NotificationType::NewReport,
                Some(report_id),
            )
            .await
        {
            Ok(count) => tracing::debug!(report_id = %report_id, count, "Notified rescuers"),
            Err(e) => tracing::warn!(error = %e, report_id = %report_id, "Failed to notify rescuers"),
        }
    }

    /// List reports, newest first.
    pub async fn list(&self, query: &ReportQuery, with_users: bool) -> AppResult<Vec<ReportView>> {
        let reports = self.report_repo.find(query).await?;
        let mut views = attach_requests(&self.adoption_repo, reports).await?;

        if with_users {
            self.attach_people(&mut views).await?;
        }

        Ok(views)
    }

    /// Reports filed by `user`, newest first.
    pub async fn my_reports(&self, user: &user::Model) -> AppResult<Vec<ReportView>> {
        let query = ReportQuery {
            created_by: Some(user.id.clone()),
            ..Default::default()
        };
        self.list(&query, false).await
    }

    /// Get a single report.
    pub async fn get(&self, id: &str) -> AppResult<ReportView> {
        let report = self.report_repo.get_by_id(id).await?;
        let adoption_requests = self.adoption_repo.find_by_report(id).await?;
        Ok(ReportView {
            report,
            adoption_requests,
            people: HashMap::new(),
        })
    }

    /// Get a single report with the users it names.
    pub async fn get_with_people(&self, id: &str) -> AppResult<ReportView> {
        let mut views = vec![self.get(id).await?];
        self.attach_people(&mut views).await?;
        Ok(views.remove(0))
    }

    async fn attach_people(&self, views: &mut [ReportView]) -> AppResult<()> {
        let mut ids: Vec<String> = views
            .iter()
            .flat_map(|v| {
                [
                    v.report.created_by.clone(),
                    v.report.assigned_to.clone(),
                    v.report.assigned_vet.clone(),
                ]
            })
            .flatten()
            .collect();
        ids.sort();
        ids.dedup();

        let people: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        for view in views.iter_mut() {
            view.people = [
                &view.report.created_by,
                &view.report.assigned_to,
                &view.report.assigned_vet,
            ]
            .into_iter()
            .flatten()
            .filter_map(|id| people.get(id).map(|u| (id.clone(), u.clone())))
            .collect();
        }

        Ok(())
    }

    /// Generic status change, validated against the lifecycle edge table.
    pub async fn update_status(
        &self,
        user: &user::Model,
        id: &str,
        status: &str,
    ) -> AppResult<ReportView> {
        let next = ReportStatus::parse(status)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid status value: {status}")))?;

        let report = self.report_repo.get_by_id(id).await?;

        let is_assigned = report.assigned_to.as_deref() == Some(user.id.as_str())
            || report.assigned_vet.as_deref() == Some(user.id.as_str());
        if !user.is_admin() && !is_assigned {
            return Err(AppError::Forbidden(
                "Only the assigned rescuer or vet can change this report".to_string(),
            ));
        }

        lifecycle::ensure_generic_target(next)?;
        lifecycle::ensure_edge(report.status, next)?;

        let changes = report::ActiveModel {
            status: Set(next),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        if !self
            .report_repo
            .update_if_status(id, &[report.status], changes)
            .await?
        {
            return Err(lifecycle::invalid_transition(report.status, "update"));
        }

        tracing::info!(
            report_id = %id,
            user_id = %user.id,
            from = %report.status.as_str(),
            to = %next.as_str(),
            "Report status changed"
        );
        self.get(id).await
    }

    /// A rescuer takes a pending case.
    pub async fn accept_rescue(&self, user: &user::Model, id: &str) -> AppResult<ReportView> {
        user.require_role(RESCUER_ROLES)?;

        let report = self.report_repo.get_by_id(id).await?;
        lifecycle::ensure_status(report.status, RESCUE_FROM, "accept")?;

        let changes = report::ActiveModel {
            status: Set(ReportStatus::InProgress),
            assigned_to: Set(Some(user.id.clone())),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        // The assignment and the rescuer's counters land together or not at all.
        let txn = self.report_repo.begin().await?;
        if !ReportRepository::update_if_status_in(&txn, id, RESCUE_FROM, changes).await? {
            return Err(lifecycle::invalid_transition(ReportStatus::InProgress, "accept"));
        }
        UserRepository::increment_rescue_stats_in(&txn, &user.id, self.points_per_rescue).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(report_id = %id, user_id = %user.id, "Rescue accepted");

        self.notifications
            .try_notify(
                &user.id,
                "Rescue Mission Accepted",
                "You have accepted a rescue mission. Please proceed to the location.",
                NotificationType::RescueAssigned,
                Some(id),
            )
            .await;

        self.get(id).await
    }

    /// A vet takes a case, directly from `Pending` or from a rescuer.
    pub async fn accept_vet_case(&self, user: &user::Model, id: &str) -> AppResult<ReportView> {
        user.require_role(VET_ROLES)?;

        let report = self.report_repo.get_by_id(id).await?;
        lifecycle::ensure_status(report.status, VET_CASE_FROM, "take")?;

        let changes = report::ActiveModel {
            status: Set(ReportStatus::UnderTreatment),
            assigned_vet: Set(Some(user.id.clone())),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        if !self.report_repo.update_if_status(id, VET_CASE_FROM, changes).await? {
            return Err(lifecycle::invalid_transition(ReportStatus::UnderTreatment, "take"));
        }

        tracing::info!(report_id = %id, vet_id = %user.id, "Vet case accepted");

        if let Some(creator) = &report.created_by {
            self.notifications
                .try_notify(
                    creator,
                    "Veterinarian Assigned",
                    &format!("Dr. {} has taken the case you reported.", user.name),
                    NotificationType::RescueAssigned,
                    Some(id),
                )
                .await;
        }

        self.get(id).await
    }

    /// The assigned vet updates the treatment record.
    pub async fn update_treatment(
        &self,
        user: &user::Model,
        id: &str,
        input: TreatmentInput,
    ) -> AppResult<ReportView> {
        input.validate()?;

        let report = self.report_repo.get_by_id(id).await?;
        if report.assigned_vet.as_deref() != Some(user.id.as_str()) {
            return Err(AppError::Forbidden(
                "Only the assigned vet can update treatment".to_string(),
            ));
        }

        let mut active: report::ActiveModel = report.into();
        if let Some(notes) = non_empty(input.vet_notes) {
            active.vet_notes = Set(Some(notes));
        }
        if let Some(plan) = non_empty(input.treatment_plan) {
            active.treatment_plan = Set(Some(plan));
        }
        if let Some(eta) = non_empty(input.estimated_recovery_time) {
            active.estimated_recovery_time = Set(Some(eta));
        }
        if let Some(info) = non_empty(input.health_info) {
            active.health_info = Set(Some(info));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.report_repo.update(active).await?;
        self.get(id).await
    }

    /// List a rescued animal for adoption.
    pub async fn post_for_adoption(
        &self,
        user: &user::Model,
        id: &str,
        input: AdoptionListingInput,
    ) -> AppResult<ReportView> {
        let report = self.report_repo.get_by_id(id).await?;
        if !user.is_admin() && !report.involves(&user.id) {
            return Err(AppError::Forbidden(
                "Only the reporter, rescuer or vet on this case can list it".to_string(),
            ));
        }
        lifecycle::ensure_status(report.status, ADOPTION_LISTING_FROM, "list for adoption")?;
        input.validate()?;

        let contact_person = input.contact_person.unwrap_or(if report.assigned_vet.is_some() {
            ContactPerson::Vet
        } else {
            ContactPerson::Reporter
        });

        let changes = report::ActiveModel {
            status: Set(ReportStatus::ReadyForAdoption),
            is_for_adoption: Set(true),
            adoption_posted_by: Set(Some(user.id.clone())),
            adoption_contact_person: Set(Some(contact_person)),
            adoption_contact_phone: Set(Some(input.contact_phone.trim().to_string())),
            adoption_contact_email: Set(Some(input.contact_email.trim().to_lowercase())),
            adoption_location: Set(non_empty(input.location)),
            adoption_fee: Set(Some(input.adoption_fee.unwrap_or(0.0))),
            adoption_requirements: Set(non_empty(input.requirements)),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        if !self
            .report_repo
            .update_if_status(id, ADOPTION_LISTING_FROM, changes)
            .await?
        {
            return Err(lifecycle::invalid_transition(
                ReportStatus::ReadyForAdoption,
                "list for adoption",
            ));
        }

        tracing::info!(report_id = %id, user_id = %user.id, "Listed for adoption");
        self.get(id).await
    }

    /// Attach a photo of the recovered animal.
    pub async fn upload_recovery_photo(
        &self,
        user: &user::Model,
        id: &str,
        photo_url: Option<String>,
    ) -> AppResult<ReportView> {
        user.require_role(VET_ROLES)?;

        let photo_url = non_empty(photo_url)
            .ok_or_else(|| AppError::BadRequest("Recovery photo URL is required".to_string()))?;

        let report = self.report_repo.get_by_id(id).await?;
        let mut active: report::ActiveModel = report.into();
        active.recovery_photo_url = Set(Some(photo_url));
        active.updated_at = Set(Some(Utc::now().into()));

        self.report_repo.update(active).await?;
        self.get(id).await
    }
}

/// Pair each report with its adoption requests in one extra query.
pub(crate) async fn attach_requests(
    adoption_repo: &AdoptionRequestRepository,
    reports: Vec<report::Model>,
) -> AppResult<Vec<ReportView>> {
    let ids: Vec<String> = reports.iter().map(|r| r.id.clone()).collect();
    let mut by_report: HashMap<String, Vec<adoption_request::Model>> = HashMap::new();
    for request in adoption_repo.find_by_reports(&ids).await? {
        by_report
            .entry(request.report_id.clone())
            .or_default()
            .push(request);
    }

    Ok(reports
        .into_iter()
        .map(|report| ReportView {
            adoption_requests: by_report.remove(&report.id).unwrap_or_default(),
            report,
            people: HashMap::new(),
        })
        .collect())
}
