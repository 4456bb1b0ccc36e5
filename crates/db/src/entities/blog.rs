//! Blog post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum BlogCategory {
    #[sea_orm(string_value = "Safety Tips")]
    #[serde(rename = "Safety Tips")]
    #[default]
    SafetyTips,
    #[sea_orm(string_value = "Rescue Stories")]
    #[serde(rename = "Rescue Stories")]
    RescueStories,
    #[sea_orm(string_value = "Animal Care")]
    #[serde(rename = "Animal Care")]
    AnimalCare,
    #[sea_orm(string_value = "Community News")]
    #[serde(rename = "Community News")]
    CommunityNews,
}

impl BlogCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SafetyTips => "Safety Tips",
            Self::RescueStories => "Rescue Stories",
            Self::AnimalCare => "Animal Care",
            Self::CommunityNews => "Community News",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub author_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "Text")]
    pub excerpt: String,

    pub category: BlogCategory,

    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    #[sea_orm(default_value = true)]
    pub is_published: bool,

    #[sea_orm(default_value = 0)]
    pub views: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
