//! User entity.

use paws_common::{AppError, AppResult};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role. `user` and `reporter` are older names for `public`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "public")]
    #[serde(alias = "user", alias = "reporter")]
    Public,
    #[sea_orm(string_value = "rescuer")]
    Rescuer,
    #[sea_orm(string_value = "vet")]
    Vet,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Parse a role name, accepting the legacy aliases.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" | "user" | "reporter" => Some(Self::Public),
            "rescuer" => Some(Self::Rescuer),
            "vet" => Some(Self::Vet),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Rescuer => "rescuer",
            Self::Vet => "vet",
            Self::Admin => "admin",
        }
    }
}

/// Hours a vet takes cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum VetAvailability {
    #[sea_orm(string_value = "24/7")]
    #[serde(rename = "24/7")]
    AllHours,
    #[sea_orm(string_value = "Business Hours")]
    #[serde(rename = "Business Hours")]
    BusinessHours,
    #[sea_orm(string_value = "On Call")]
    #[serde(rename = "On Call")]
    OnCall,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Stored lowercase.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: UserRole,

    pub lat: f64,

    pub lng: f64,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// Whether the user currently accepts rescue or vet work.
    #[sea_orm(default_value = true)]
    pub is_available: bool,

    /// Rescuer gamification points.
    #[sea_orm(default_value = 0)]
    pub points: i32,

    /// Number of rescues accepted.
    #[sea_orm(default_value = 0)]
    pub rescue_count: i32,

    // Vet profile
    #[sea_orm(nullable)]
    pub clinic_name: Option<String>,

    #[sea_orm(nullable)]
    pub specialization: Option<String>,

    /// Years of practice.
    #[sea_orm(nullable)]
    pub experience: Option<i32>,

    #[sea_orm(nullable)]
    pub vet_availability: Option<VetAvailability>,

    #[sea_orm(nullable)]
    pub emergency_contact: Option<String>,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,

    #[sea_orm(has_many = "super::blog::Entity")]
    Blogs,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Whether this user holds one of `roles`.
    #[must_use]
    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }

    /// Reject with `Forbidden` unless this user holds one of `roles`.
    pub fn require_role(&self, roles: &[UserRole]) -> AppResult<()> {
        if self.has_role(roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role {} may not perform this action",
                self.role.as_str()
            )))
        }
    }
}
