//! Adoption service: requests to adopt listed animals and their review.

use chrono::Utc;
use paws_common::{AppError, AppResult, IdGenerator};
use paws_db::{
    entities::{
        adoption_request::{self, AdoptionRequestStatus},
        notification::NotificationType,
        report::{self, ReportStatus},
        user,
    },
    repositories::{AdoptionRequestRepository, ReportRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::{
    lifecycle::{self, ADOPTER_ROLES, ADOPTION_APPROVAL_FROM, ADOPTION_MANAGER_ROLES},
    notification::NotificationService,
    report::{ReportView, attach_requests},
    user::non_empty,
};

/// How an applicant can be reached.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContactInfo {
    #[validate(length(min = 1, max = 32))]
    pub phone: String,

    #[validate(email)]
    pub email: String,
}

/// Input for requesting to adopt.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequestInput {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,

    #[validate(nested)]
    pub contact_info: ContactInfo,
}

/// A reviewer's decision on a request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionDecisionInput {
    pub status: AdoptionRequestStatus,

    #[validate(length(max = 2000))]
    pub response_message: Option<String>,
}

/// Adoption service for business logic.
#[derive(Clone)]
pub struct AdoptionService {
    report_repo: ReportRepository,
    adoption_repo: AdoptionRequestRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl AdoptionService {
    /// Create a new adoption service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        adoption_repo: AdoptionRequestRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            report_repo,
            adoption_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply to adopt the animal on `report_id`.
    pub async fn request(
        &self,
        user: &user::Model,
        report_id: &str,
        input: AdoptionRequestInput,
    ) -> AppResult<adoption_request::Model> {
        user.require_role(ADOPTER_ROLES)?;
        input.validate()?;

        let report = self.report_repo.get_by_id(report_id).await?;
        if report.status != ReportStatus::ReadyForAdoption || !report.is_for_adoption {
            return Err(AppError::BadRequest(
                "This animal is not available for adoption".to_string(),
            ));
        }

        if self
            .adoption_repo
            .find_active_by_applicant(report_id, &user.id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "You have already requested to adopt this animal".to_string(),
            ));
        }

        let model = adoption_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            report_id: Set(report_id.to_string()),
            applicant_id: Set(user.id.clone()),
            applicant_name: Set(user.name.clone()),
            message: Set(input.message.trim().to_string()),
            contact_phone: Set(input.contact_info.phone.trim().to_string()),
            contact_email: Set(input.contact_info.email.trim().to_lowercase()),
            status: Set(AdoptionRequestStatus::Pending),
            response_message: Set(None),
            created_at: Set(Utc::now().into()),
            responded_at: Set(None),
        };
        let request = self.adoption_repo.create(model).await?;

        tracing::info!(
            report_id = %report_id,
            request_id = %request.id,
            applicant_id = %user.id,
            "Adoption requested"
        );

        if let Some(poster) = &report.adoption_posted_by {
            self.notifications
                .try_notify(
                    poster,
                    "New Adoption Request",
                    &format!("{} wants to adopt {}.", user.name, animal_label(&report)),
                    NotificationType::AdoptionRequest,
                    Some(report_id),
                )
                .await;
        }

        Ok(request)
    }

    /// Listings whose requests `user` may decide. Admins see every listing.
    pub async fn manageable(&self, user: &user::Model) -> AppResult<Vec<ReportView>> {
        user.require_role(ADOPTION_MANAGER_ROLES)?;

        let decider = (!user.is_admin()).then_some(user.id.as_str());
        let reports = self.report_repo.find_adoption_listings(decider).await?;
        attach_requests(&self.adoption_repo, reports).await
    }

    /// Approve or reject a pending request. Approval adopts the animal.
    pub async fn decide(
        &self,
        user: &user::Model,
        report_id: &str,
        request_id: &str,
        input: AdoptionDecisionInput,
    ) -> AppResult<ReportView> {
        user.require_role(ADOPTION_MANAGER_ROLES)?;
        input.validate()?;
        if input.status == AdoptionRequestStatus::Pending {
            return Err(AppError::BadRequest(
                "Decision must be Approved or Rejected".to_string(),
            ));
        }

        let report = self.report_repo.get_by_id(report_id).await?;
        let may_decide = user.is_admin()
            || report.adoption_posted_by.as_deref() == Some(user.id.as_str())
            || report.assigned_to.as_deref() == Some(user.id.as_str());
        if !may_decide {
            return Err(AppError::Forbidden(
                "Only the lister or rescuer can decide adoption requests".to_string(),
            ));
        }

        let request = self
            .adoption_repo
            .find_in_report(report_id, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Adoption request not found".to_string()))?;
        if request.status != AdoptionRequestStatus::Pending {
            return Err(AppError::BadRequest(
                "Adoption request has already been decided".to_string(),
            ));
        }

        let approved = input.status == AdoptionRequestStatus::Approved;
        if approved {
            lifecycle::ensure_status(report.status, ADOPTION_APPROVAL_FROM, "approve adoption for")?;
        }

        // Both compare-and-swaps commit together; losing either rolls back the other.
        let txn = self.report_repo.begin().await?;
        if approved {
            let changes = report::ActiveModel {
                status: Set(ReportStatus::Adopted),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            };
            if !ReportRepository::update_if_status_in(
                &txn,
                report_id,
                ADOPTION_APPROVAL_FROM,
                changes,
            )
            .await?
            {
                return Err(lifecycle::invalid_transition(
                    ReportStatus::Adopted,
                    "approve adoption for",
                ));
            }
        }

        let changes = adoption_request::ActiveModel {
            status: Set(input.status),
            response_message: Set(non_empty(input.response_message)),
            responded_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        if !AdoptionRequestRepository::update_if_pending_in(&txn, request_id, changes).await? {
            return Err(AppError::InvalidTransition(
                "Adoption request has already been decided".to_string(),
            ));
        }
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            report_id = %report_id,
            request_id = %request_id,
            decided_by = %user.id,
            approved,
            "Adoption request decided"
        );

        if approved {
            self.notifications
                .try_notify(
                    &request.applicant_id,
                    "Adoption Approved!",
                    &format!(
                        "Your request to adopt {} has been approved.",
                        animal_label(&report)
                    ),
                    NotificationType::AdoptionRequest,
                    Some(report_id),
                )
                .await;
        }

        let report = self.report_repo.get_by_id(report_id).await?;
        let adoption_requests = self.adoption_repo.find_by_report(report_id).await?;
        Ok(ReportView {
            report,
            adoption_requests,
            people: std::collections::HashMap::new(),
        })
    }
}

fn animal_label(report: &report::Model) -> String {
    report
        .animal_name
        .clone()
        .or_else(|| report.animal_type.as_ref().map(|t| format!("the {t}")))
        .unwrap_or_else(|| "this animal".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use paws_db::{
        entities::user::UserRole, repositories::NotificationRepository, test_utils::fixtures,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Transaction};
    use std::sync::Arc;

    struct Dbs {
        reports: Arc<DatabaseConnection>,
        requests: Arc<DatabaseConnection>,
        notifications: Arc<DatabaseConnection>,
    }

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn log(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
        Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
    }

    fn create_test_service(
        reports: MockDatabase,
        requests: MockDatabase,
        notifications: MockDatabase,
    ) -> (AdoptionService, Dbs) {
        let dbs = Dbs {
            reports: Arc::new(reports.into_connection()),
            requests: Arc::new(requests.into_connection()),
            notifications: Arc::new(notifications.into_connection()),
        };
        let service = AdoptionService::new(
            ReportRepository::new(dbs.reports.clone()),
            AdoptionRequestRepository::new(dbs.requests.clone()),
            NotificationService::new(NotificationRepository::new(dbs.notifications.clone()), 50),
        );
        (service, dbs)
    }

    fn listed_report() -> report::Model {
        let mut report = fixtures::report("r1", ReportStatus::ReadyForAdoption, Some("u1"));
        report.assigned_to = Some("a".to_string());
        report.is_for_adoption = true;
        report.adoption_posted_by = Some("a".to_string());
        report
    }

    fn request_input() -> AdoptionRequestInput {
        AdoptionRequestInput {
            message: "please".to_string(),
            contact_info: ContactInfo {
                phone: "1".to_string(),
                email: "b@x.com".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_request_appends_pending_and_notifies_lister() {
        let created =
            fixtures::adoption_request("ar1", "r1", "b", AdoptionRequestStatus::Pending);
        let applicant = fixtures::user("b", UserRole::Public);

        let (service, dbs) = create_test_service(
            mock().append_query_results([[listed_report()]]),
            mock()
                .append_query_results([Vec::<adoption_request::Model>::new()])
                .append_query_results([[created]]),
            mock().append_query_results([[fixtures::notification("n1", "a")]]),
        );

        let request = service
            .request(&applicant, "r1", request_input())
            .await
            .unwrap();
        assert_eq!(request.status, AdoptionRequestStatus::Pending);

        drop(service);
        let notes = log(dbs.notifications);
        assert_eq!(notes.len(), 1);
        assert!(format!("{:?}", notes[0]).contains("New Adoption Request"));
    }

    #[tokio::test]
    async fn test_duplicate_request_rejected() {
        let existing = fixtures::adoption_request("ar1", "r1", "b", AdoptionRequestStatus::Pending);
        let applicant = fixtures::user("b", UserRole::Public);

        let (service, dbs) = create_test_service(
            mock().append_query_results([[listed_report()]]),
            mock().append_query_results([[existing]]),
            mock(),
        );

        let result = service.request(&applicant, "r1", request_input()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        drop(service);
        // Only the duplicate lookup ran; nothing was inserted.
        assert_eq!(log(dbs.requests).len(), 1);
        assert!(log(dbs.notifications).is_empty());
    }

    #[tokio::test]
    async fn test_request_rejected_when_not_listed() {
        let report = fixtures::report("r1", ReportStatus::InProgress, None);
        let applicant = fixtures::user("b", UserRole::Public);

        let (service, _dbs) =
            create_test_service(mock().append_query_results([[report]]), mock(), mock());

        let result = service.request(&applicant, "r1", request_input()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_request_rejected_when_listing_flag_missing() {
        let mut report = listed_report();
        report.is_for_adoption = false;
        let applicant = fixtures::user("b", UserRole::Public);

        let (service, dbs) =
            create_test_service(mock().append_query_results([[report]]), mock(), mock());

        let result = service.request(&applicant, "r1", request_input()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        drop(service);
        assert!(log(dbs.requests).is_empty());
    }

    #[tokio::test]
    async fn test_request_requires_contact_info() {
        let applicant = fixtures::user("b", UserRole::Public);
        let (service, _dbs) = create_test_service(mock(), mock(), mock());

        let mut input = request_input();
        input.contact_info.email = String::new();
        let result = service.request(&applicant, "r1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_vet_cannot_request() {
        let vet = fixtures::user("v", UserRole::Vet);
        let (service, _dbs) = create_test_service(mock(), mock(), mock());

        let result = service.request(&vet, "r1", request_input()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_approve_adopts_report_and_notifies_applicant() {
        let pending = fixtures::adoption_request("ar1", "r1", "b", AdoptionRequestStatus::Pending);
        let mut approved = pending.clone();
        approved.status = AdoptionRequestStatus::Approved;
        let mut adopted = listed_report();
        adopted.status = ReportStatus::Adopted;

        let rescuer = fixtures::user("a", UserRole::Rescuer);
        // Both compare-and-swaps run in the report connection's transaction.
        let (service, dbs) = create_test_service(
            mock()
                .append_query_results([[listed_report()]])
                .append_exec_results([exec(1), exec(1)])
                .append_query_results([[adopted]]),
            mock()
                .append_query_results([[pending]])
                .append_query_results([[approved]]),
            mock().append_query_results([[fixtures::notification("n1", "b")]]),
        );

        let view = service
            .decide(
                &rescuer,
                "r1",
                "ar1",
                AdoptionDecisionInput {
                    status: AdoptionRequestStatus::Approved,
                    response_message: Some("Welcome!".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(view.report.status, ReportStatus::Adopted);
        assert_eq!(view.adoption_requests[0].status, AdoptionRequestStatus::Approved);

        drop(service);
        let writes = format!("{:?}", log(dbs.reports));
        assert!(writes.contains("adoption_request"));
        assert!(writes.contains("COMMIT"));
        let notes = log(dbs.notifications);
        assert_eq!(notes.len(), 1);
        assert!(format!("{:?}", notes[0]).contains("Adoption Approved!"));
    }

    #[tokio::test]
    async fn test_approve_rolls_back_when_request_already_decided() {
        let pending = fixtures::adoption_request("ar1", "r1", "b", AdoptionRequestStatus::Pending);
        let rescuer = fixtures::user("a", UserRole::Rescuer);

        // The report swap wins but another reviewer decided the request first.
        let (service, dbs) = create_test_service(
            mock()
                .append_query_results([[listed_report()]])
                .append_exec_results([exec(1), exec(0)]),
            mock().append_query_results([[pending]]),
            mock(),
        );

        let result = service
            .decide(
                &rescuer,
                "r1",
                "ar1",
                AdoptionDecisionInput {
                    status: AdoptionRequestStatus::Approved,
                    response_message: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));

        drop(service);
        assert!(!format!("{:?}", log(dbs.reports)).contains("COMMIT"));
        assert!(log(dbs.notifications).is_empty());
    }

    #[tokio::test]
    async fn test_approve_rejected_when_report_not_listed() {
        let mut report = listed_report();
        report.status = ReportStatus::Adopted;
        let pending = fixtures::adoption_request("ar2", "r1", "c", AdoptionRequestStatus::Pending);
        let rescuer = fixtures::user("a", UserRole::Rescuer);

        let (service, dbs) = create_test_service(
            mock().append_query_results([[report]]),
            mock().append_query_results([[pending]]),
            mock(),
        );

        let result = service
            .decide(
                &rescuer,
                "r1",
                "ar2",
                AdoptionDecisionInput {
                    status: AdoptionRequestStatus::Approved,
                    response_message: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));

        drop(service);
        assert!(log(dbs.notifications).is_empty());
    }

    #[tokio::test]
    async fn test_reject_leaves_report_listed() {
        let pending = fixtures::adoption_request("ar1", "r1", "b", AdoptionRequestStatus::Pending);
        let mut rejected = pending.clone();
        rejected.status = AdoptionRequestStatus::Rejected;
        let admin = fixtures::user("admin", UserRole::Admin);

        let (service, dbs) = create_test_service(
            mock()
                .append_query_results([[listed_report()]])
                .append_exec_results([exec(1)])
                .append_query_results([[listed_report()]]),
            mock()
                .append_query_results([[pending]])
                .append_query_results([[rejected]]),
            mock(),
        );

        let view = service
            .decide(
                &admin,
                "r1",
                "ar1",
                AdoptionDecisionInput {
                    status: AdoptionRequestStatus::Rejected,
                    response_message: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(view.report.status, ReportStatus::ReadyForAdoption);
        assert_eq!(view.adoption_requests[0].status, AdoptionRequestStatus::Rejected);

        drop(service);
        assert!(log(dbs.notifications).is_empty());
    }

    #[tokio::test]
    async fn test_decide_requires_lister_or_rescuer() {
        let vet = fixtures::user("v", UserRole::Vet);
        let (service, _dbs) = create_test_service(
            mock().append_query_results([[listed_report()]]),
            mock(),
            mock(),
        );

        let result = service
            .decide(
                &vet,
                "r1",
                "ar1",
                AdoptionDecisionInput {
                    status: AdoptionRequestStatus::Approved,
                    response_message: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_decide_already_decided() {
        let approved = fixtures::adoption_request("ar1", "r1", "b", AdoptionRequestStatus::Approved);
        let rescuer = fixtures::user("a", UserRole::Rescuer);

        let (service, _dbs) = create_test_service(
            mock().append_query_results([[listed_report()]]),
            mock().append_query_results([[approved]]),
            mock(),
        );

        let result = service
            .decide(
                &rescuer,
                "r1",
                "ar1",
                AdoptionDecisionInput {
                    status: AdoptionRequestStatus::Rejected,
                    response_message: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_manageable_scopes_non_admins() {
        let rescuer = fixtures::user("a", UserRole::Rescuer);
        let (service, dbs) = create_test_service(
            mock().append_query_results([[listed_report()]]),
            mock().append_query_results([Vec::<adoption_request::Model>::new()]),
            mock(),
        );

        let views = service.manageable(&rescuer).await.unwrap();
        assert_eq!(views.len(), 1);

        drop(service);
        let queries = log(dbs.reports);
        assert!(format!("{:?}", queries[0]).contains("adoption_posted_by"));
    }

    #[test]
    fn test_animal_label() {
        let mut report = fixtures::report("r1", ReportStatus::Pending, None);
        assert_eq!(animal_label(&report), "the dog");
        report.animal_name = Some("Biscuit".to_string());
        assert_eq!(animal_label(&report), "Biscuit");
        report.animal_name = None;
        report.animal_type = None;
        assert_eq!(animal_label(&report), "this animal");
    }
}
