//! Vet directory and vet case lists.

use paws_common::{AppError, AppResult, GeoPoint};
use paws_db::{
    entities::{
        notification::NotificationType,
        user::{self, UserRole},
    },
    repositories::{AdoptionRequestRepository, ReportRepository, UserRepository},
};
use serde::Deserialize;
use validator::Validate;

use super::{
    lifecycle::VET_ROLES,
    notification::NotificationService,
    report::{ReportView, attach_requests},
};

/// A vet and their distance from the search point.
#[derive(Debug, Clone)]
pub struct NearbyVet {
    pub vet: user::Model,
    pub distance_km: f64,
}

/// Emergency contact request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VetContactInput {
    #[validate(length(min = 1))]
    pub vet_id: String,

    #[validate(length(min = 1))]
    pub report_id: String,

    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

/// Vet service.
#[derive(Clone)]
pub struct VetService {
    user_repo: UserRepository,
    report_repo: ReportRepository,
    adoption_repo: AdoptionRequestRepository,
    notifications: NotificationService,
    default_radius_km: f64,
}

impl VetService {
    /// Create a new vet service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        report_repo: ReportRepository,
        adoption_repo: AdoptionRequestRepository,
        notifications: NotificationService,
        default_radius_km: f64,
    ) -> Self {
        Self {
            user_repo,
            report_repo,
            adoption_repo,
            notifications,
            default_radius_km,
        }
    }

    /// Available vets within `radius_km` of (`lat`, `lng`), nearest first.
    pub async fn nearby(
        &self,
        lat: Option<f64>,
        lng: Option<f64>,
        radius_km: Option<f64>,
    ) -> AppResult<Vec<NearbyVet>> {
        let (Some(lat), Some(lng)) = (lat, lng) else {
            return Err(AppError::BadRequest(
                "Latitude and longitude are required".to_string(),
            ));
        };
        let origin = GeoPoint::new(lat, lng)
            .ok_or_else(|| AppError::BadRequest("Coordinates out of range".to_string()))?;
        let radius = radius_km
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(self.default_radius_km);

        let vets = self.user_repo.find_available_by_role(UserRole::Vet).await?;
        Ok(within_radius(&origin, vets, radius))
    }

    /// Send an emergency notification to a vet and return the vet's contact
    /// card. The vet is not assigned.
    pub async fn contact(&self, input: VetContactInput) -> AppResult<user::Model> {
        input.validate()?;

        let vet = self.user_repo.get_by_id(&input.vet_id).await?;
        if vet.role != UserRole::Vet {
            return Err(AppError::UserNotFound(input.vet_id));
        }
        let report = self.report_repo.get_by_id(&input.report_id).await?;

        let detail = input
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("An animal needs immediate veterinary attention.");

        self.notifications
            .notify(
                &vet.id,
                "Emergency Animal Case",
                &format!("Urgent: {detail}"),
                NotificationType::NewReport,
                Some(&report.id),
            )
            .await?;

        tracing::info!(vet_id = %vet.id, report_id = %report.id, "Vet contacted");
        Ok(vet)
    }

    /// Cases assigned to the calling vet. With `include_open`, also cases
    /// still waiting for a vet.
    pub async fn cases(&self, user: &user::Model, include_open: bool) -> AppResult<Vec<ReportView>> {
        user.require_role(VET_ROLES)?;

        let reports = self.report_repo.find_vet_cases(&user.id, include_open).await?;
        attach_requests(&self.adoption_repo, reports).await
    }
}

fn within_radius(origin: &GeoPoint, vets: Vec<user::Model>, radius_km: f64) -> Vec<NearbyVet> {
    let mut nearby: Vec<NearbyVet> = vets
        .into_iter()
        .filter_map(|vet| {
            let distance_km = origin.distance_km(&GeoPoint {
                lat: vet.lat,
                lng: vet.lng,
            });
            (distance_km <= radius_km).then_some(NearbyVet { vet, distance_km })
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use paws_db::{
        entities::{adoption_request, report::ReportStatus},
        repositories::NotificationRepository,
        test_utils::fixtures,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn create_test_service(
        users: MockDatabase,
        reports: MockDatabase,
        requests: MockDatabase,
        notifications: MockDatabase,
    ) -> (VetService, Arc<DatabaseConnection>) {
        let notifications = Arc::new(notifications.into_connection());
        let service = VetService::new(
            UserRepository::new(Arc::new(users.into_connection())),
            ReportRepository::new(Arc::new(reports.into_connection())),
            AdoptionRequestRepository::new(Arc::new(requests.into_connection())),
            NotificationService::new(NotificationRepository::new(notifications.clone()), 50),
            10.0,
        );
        (service, notifications)
    }

    fn vet_at(id: &str, lat: f64, lng: f64) -> user::Model {
        let mut vet = fixtures::user(id, UserRole::Vet);
        vet.lat = lat;
        vet.lng = lng;
        vet
    }

    #[test]
    fn test_within_radius_sorts_nearest_first() {
        let origin = GeoPoint::new(0.0, 0.0).unwrap();
        let vets = vec![
            vet_at("far", 0.08, 0.0),
            vet_at("near", 0.01, 0.0),
            vet_at("outside", 1.0, 0.0),
        ];

        let found = within_radius(&origin, vets, 10.0);
        let ids: Vec<&str> = found.iter().map(|n| n.vet.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far"]);
        assert!(found[0].distance_km < found[1].distance_km);
    }

    #[tokio::test]
    async fn test_nearby_requires_coordinates() {
        let (service, _) = create_test_service(mock(), mock(), mock(), mock());
        let result = service.nearby(Some(1.0), None, None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_nearby_uses_default_radius() {
        let (service, _) = create_test_service(
            mock().append_query_results([[vet_at("v1", 0.05, 0.0), vet_at("v2", 0.5, 0.0)]]),
            mock(),
            mock(),
            mock(),
        );

        let found = service.nearby(Some(0.0), Some(0.0), None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].vet.id, "v1");
    }

    #[tokio::test]
    async fn test_contact_notifies_without_assigning() {
        let report = fixtures::report("r1", ReportStatus::Pending, None);
        let (service, notifications) = create_test_service(
            mock().append_query_results([[vet_at("v1", 0.0, 0.0)]]),
            mock().append_query_results([[report]]),
            mock(),
            mock().append_query_results([[fixtures::notification("n1", "v1")]]),
        );

        let vet = service
            .contact(VetContactInput {
                vet_id: "v1".to_string(),
                report_id: "r1".to_string(),
                message: Some("bleeding".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(vet.id, "v1");

        drop(service);
        let log = Arc::try_unwrap(notifications)
            .ok()
            .unwrap()
            .into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(format!("{:?}", log[0]).contains("Urgent: bleeding"));
    }

    #[tokio::test]
    async fn test_contact_rejects_non_vet() {
        let (service, _) = create_test_service(
            mock().append_query_results([[fixtures::user("u1", UserRole::Public)]]),
            mock(),
            mock(),
            mock(),
        );

        let result = service
            .contact(VetContactInput {
                vet_id: "u1".to_string(),
                report_id: "r1".to_string(),
                message: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_contact_missing_report() {
        let (service, _) = create_test_service(
            mock().append_query_results([[vet_at("v1", 0.0, 0.0)]]),
            mock().append_query_results([Vec::<paws_db::entities::report::Model>::new()]),
            mock(),
            mock(),
        );

        let result = service
            .contact(VetContactInput {
                vet_id: "v1".to_string(),
                report_id: "missing".to_string(),
                message: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::ReportNotFound(_))));
    }

    #[tokio::test]
    async fn test_cases_requires_vet() {
        let (service, _) = create_test_service(mock(), mock(), mock(), mock());
        let rescuer = fixtures::user("a", UserRole::Rescuer);
        assert!(matches!(
            service.cases(&rescuer, true).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_cases_attach_requests() {
        let mut report = fixtures::report("r1", ReportStatus::UnderTreatment, None);
        report.assigned_vet = Some("v1".to_string());
        let request =
            fixtures::adoption_request("ar1", "r1", "b", adoption_request::AdoptionRequestStatus::Pending);

        let (service, _) = create_test_service(
            mock(),
            mock().append_query_results([[report]]),
            mock().append_query_results([[request]]),
            mock(),
        );

        let vet = fixtures::user("v1", UserRole::Vet);
        let cases = service.cases(&vet, false).await.unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].adoption_requests.len(), 1);
    }
}
