//! Badge entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a badge is awarded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    #[sea_orm(string_value = "publications")]
    Publications,
    #[sea_orm(string_value = "likes_received")]
    LikesReceived,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "badge")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(nullable)]
    pub icon: Option<String>,

    /// Milestone the badge is tied to.
    pub kind: BadgeKind,

    /// Count at which the badge is awarded.
    pub threshold: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_badge::Entity")]
    UserBadges,
}

impl ActiveModelBehavior for ActiveModel {}
