//! Report entity: one reported animal case.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What the reporter observed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum IssueType {
    #[sea_orm(string_value = "Injured")]
    Injured,
    #[sea_orm(string_value = "Starving")]
    Starving,
    #[sea_orm(string_value = "Lost")]
    Lost,
    #[sea_orm(string_value = "Other")]
    #[default]
    Other,
}

impl IssueType {
    /// Display name, identical to the stored value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Injured => "Injured",
            Self::Starving => "Starving",
            Self::Lost => "Lost",
            Self::Other => "Other",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InjurySeverity {
    #[sea_orm(string_value = "Low")]
    Low,
    #[sea_orm(string_value = "Medium")]
    #[default]
    Medium,
    #[sea_orm(string_value = "High")]
    High,
}

/// Lifecycle state of a report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ReportStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Under Treatment")]
    #[serde(rename = "Under Treatment")]
    UnderTreatment,
    #[sea_orm(string_value = "Ready for Adoption")]
    #[serde(rename = "Ready for Adoption")]
    ReadyForAdoption,
    #[sea_orm(string_value = "Adopted")]
    Adopted,
}

impl ReportStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::UnderTreatment,
        Self::ReadyForAdoption,
        Self::Adopted,
    ];

    /// Wire and storage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::UnderTreatment => "Under Treatment",
            Self::ReadyForAdoption => "Ready for Adoption",
            Self::Adopted => "Adopted",
        }
    }

    /// Parse a status name. Matching ignores case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
    }

    /// States reachable from this one in a single transition.
    #[must_use]
    pub const fn allowed_targets(&self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::InProgress, Self::UnderTreatment],
            Self::InProgress => &[Self::UnderTreatment, Self::ReadyForAdoption],
            Self::UnderTreatment => &[Self::ReadyForAdoption],
            Self::ReadyForAdoption => &[Self::Adopted],
            Self::Adopted => &[],
        }
    }

    /// Whether the lifecycle has an edge from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        self.allowed_targets().contains(&next)
    }

    /// States with no outgoing edge.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Adopted)
    }
}

/// Who adopters should contact about a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ContactPerson {
    #[sea_orm(string_value = "reporter")]
    Reporter,
    #[sea_orm(string_value = "rescuer")]
    Rescuer,
    #[sea_orm(string_value = "vet")]
    Vet,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// URL of the photo on the external media host.
    pub photo_url: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub lat: f64,

    pub lng: f64,

    pub issue_type: IssueType,

    #[sea_orm(nullable)]
    pub animal_type: Option<String>,

    #[sea_orm(nullable)]
    pub animal_name: Option<String>,

    pub injury_severity: InjurySeverity,

    /// JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub first_aid_suggestions: Json,

    #[sea_orm(nullable)]
    pub reporter_phone: Option<String>,

    #[sea_orm(nullable)]
    pub reporter_email: Option<String>,

    pub status: ReportStatus,

    /// NULL for anonymous reports.
    #[sea_orm(nullable)]
    pub created_by: Option<String>,

    /// Rescuer, set only by accept-rescue.
    #[sea_orm(nullable)]
    pub assigned_to: Option<String>,

    /// Vet, set only by accept-vet-case.
    #[sea_orm(nullable)]
    pub assigned_vet: Option<String>,

    #[sea_orm(nullable)]
    pub recovery_photo_url: Option<String>,

    // Treatment record
    #[sea_orm(column_type = "Text", nullable)]
    pub health_info: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub vet_notes: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub treatment_plan: Option<String>,

    #[sea_orm(nullable)]
    pub estimated_recovery_time: Option<String>,

    // Adoption listing, populated only by post-for-adoption
    #[sea_orm(default_value = false)]
    pub is_for_adoption: bool,

    #[sea_orm(nullable)]
    pub adoption_posted_by: Option<String>,

    #[sea_orm(nullable)]
    pub adoption_contact_person: Option<ContactPerson>,

    #[sea_orm(nullable)]
    pub adoption_contact_phone: Option<String>,

    #[sea_orm(nullable)]
    pub adoption_contact_email: Option<String>,

    #[sea_orm(nullable)]
    pub adoption_location: Option<String>,

    #[sea_orm(nullable)]
    pub adoption_fee: Option<f64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub adoption_requirements: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Creator,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Rescuer,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedVet",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Vet,

    #[sea_orm(has_many = "super::adoption_request::Entity")]
    AdoptionRequests,
}

impl Related<super::adoption_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdoptionRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether `user_id` is the rescuer, the vet or the creator of this report.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        [&self.assigned_to, &self.assigned_vet, &self.created_by]
            .into_iter()
            .any(|u| u.as_deref() == Some(user_id))
    }
}
