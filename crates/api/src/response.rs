//! API response types.
//!
//! Entities are never serialized directly: every body goes through one of the
//! camelCase DTOs below so storage column names do not leak into the API.

#![allow(missing_docs)]

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use paws_core::{BlogView, NearbyVet, ReportView};
use paws_db::entities::{
    adoption_request::{self, AdoptionRequestStatus},
    blog::BlogCategory,
    notification::{self, NotificationType},
    report::{ContactPerson, InjurySeverity, IssueType, ReportStatus},
    user::{self, UserRole, VetAvailability},
};
use serde::Serialize;

/// A JSON body with a status code.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    status: StatusCode,
    body: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `body`.
    pub const fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// 201 with `body`.
    pub const fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// `{"message": ...}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 200 with a message body.
pub fn message(text: impl Into<String>) -> ApiResponse<MessageResponse> {
    ApiResponse::ok(MessageResponse {
        message: text.into(),
    })
}

/// `{"count": n}`.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub is_available: bool,
    pub points: i32,
    pub rescue_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vet_availability: Option<VetAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            phone: u.phone,
            lat: u.lat,
            lng: u.lng,
            is_available: u.is_available,
            points: u.points,
            rescue_count: u.rescue_count,
            clinic_name: u.clinic_name,
            specialization: u.specialization,
            experience: u.experience,
            vet_availability: u.vet_availability,
            emergency_contact: u.emergency_contact,
            website: u.website,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// The public face of a user embedded in other objects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

impl From<&user::Model> for UserSummary {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactInfoResponse {
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionInfoResponse {
    pub posted_by: Option<String>,
    pub contact_person: Option<ContactPerson>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub location: Option<String>,
    pub adoption_fee: f64,
    pub requirements: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequestResponse {
    pub id: String,
    pub user_id: String,
    pub applicant_name: String,
    pub message: String,
    pub status: AdoptionRequestStatus,
    pub contact_info: ContactInfoResponse,
    pub response_message: Option<String>,
    pub created_at: String,
    pub responded_at: Option<String>,
}

impl From<adoption_request::Model> for AdoptionRequestResponse {
    fn from(r: adoption_request::Model) -> Self {
        Self {
            id: r.id,
            user_id: r.applicant_id,
            applicant_name: r.applicant_name,
            message: r.message,
            status: r.status,
            contact_info: ContactInfoResponse {
                phone: Some(r.contact_phone),
                email: Some(r.contact_email),
            },
            response_message: r.response_message,
            created_at: r.created_at.to_rfc3339(),
            responded_at: r.responded_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub issue_type: IssueType,
    pub animal_type: Option<String>,
    pub animal_name: Option<String>,
    pub injury_severity: InjurySeverity,
    pub first_aid_suggestions: serde_json::Value,
    pub reporter_contact: ContactInfoResponse,
    pub status: ReportStatus,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub assigned_vet: Option<String>,
    #[serde(rename = "recoveryPhotoURL")]
    pub recovery_photo_url: Option<String>,
    pub health_info: Option<String>,
    pub vet_notes: Option<String>,
    pub treatment_plan: Option<String>,
    pub estimated_recovery_time: Option<String>,
    pub is_for_adoption: bool,
    pub adoption_info: Option<AdoptionInfoResponse>,
    pub adoption_requests: Vec<AdoptionRequestResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescuer: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vet: Option<UserSummary>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<ReportView> for ReportResponse {
    fn from(view: ReportView) -> Self {
        let creator = view.person(view.report.created_by.as_deref()).map(UserSummary::from);
        let rescuer = view.person(view.report.assigned_to.as_deref()).map(UserSummary::from);
        let vet = view.person(view.report.assigned_vet.as_deref()).map(UserSummary::from);

        let r = view.report;
        let adoption_info = r.is_for_adoption.then(|| AdoptionInfoResponse {
            posted_by: r.adoption_posted_by.clone(),
            contact_person: r.adoption_contact_person,
            contact_phone: r.adoption_contact_phone.clone(),
            contact_email: r.adoption_contact_email.clone(),
            location: r.adoption_location.clone(),
            adoption_fee: r.adoption_fee.unwrap_or(0.0),
            requirements: r.adoption_requirements.clone(),
        });

        Self {
            id: r.id,
            photo_url: r.photo_url,
            description: r.description,
            lat: r.lat,
            lng: r.lng,
            issue_type: r.issue_type,
            animal_type: r.animal_type,
            animal_name: r.animal_name,
            injury_severity: r.injury_severity,
            first_aid_suggestions: r.first_aid_suggestions,
            reporter_contact: ContactInfoResponse {
                phone: r.reporter_phone,
                email: r.reporter_email,
            },
            status: r.status,
            created_by: r.created_by,
            assigned_to: r.assigned_to,
            assigned_vet: r.assigned_vet,
            recovery_photo_url: r.recovery_photo_url,
            health_info: r.health_info,
            vet_notes: r.vet_notes,
            treatment_plan: r.treatment_plan,
            estimated_recovery_time: r.estimated_recovery_time,
            is_for_adoption: r.is_for_adoption,
            adoption_info,
            adoption_requests: view
                .adoption_requests
                .into_iter()
                .map(AdoptionRequestResponse::from)
                .collect(),
            creator,
            rescuer,
            vet,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Convert a list of views.
pub fn reports(views: Vec<ReportView>) -> Vec<ReportResponse> {
    views.into_iter().map(ReportResponse::from).collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub related_report: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            title: n.title,
            message: n.message,
            notification_type: n.notification_type,
            related_report: n.related_report_id,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// A vet's contact card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VetResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub clinic_name: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<i32>,
    pub vet_availability: Option<VetAvailability>,
    pub emergency_contact: Option<String>,
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<user::Model> for VetResponse {
    fn from(v: user::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            email: v.email,
            phone: v.phone,
            lat: v.lat,
            lng: v.lng,
            clinic_name: v.clinic_name,
            specialization: v.specialization,
            experience: v.experience,
            vet_availability: v.vet_availability,
            emergency_contact: v.emergency_contact,
            website: v.website,
            distance_km: None,
        }
    }
}

impl From<NearbyVet> for VetResponse {
    fn from(n: NearbyVet) -> Self {
        Self {
            distance_km: Some((n.distance_km * 100.0).round() / 100.0),
            ..Self::from(n.vet)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogAuthor {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub clinic_name: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub category: BlogCategory,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub is_published: bool,
    pub views: i32,
    pub author: Option<BlogAuthor>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<BlogView> for BlogResponse {
    fn from(view: BlogView) -> Self {
        let b = view.blog;
        Self {
            id: b.id,
            title: b.title,
            content: b.content,
            excerpt: b.excerpt,
            category: b.category,
            image_url: b.image_url,
            is_published: b.is_published,
            views: b.views,
            author: view.author.map(|a| BlogAuthor {
                id: a.id,
                name: a.name,
                role: a.role,
                clinic_name: a.clinic_name,
                specialization: a.specialization,
            }),
            created_at: b.created_at.to_rfc3339(),
            updated_at: b.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}
