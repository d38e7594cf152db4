//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum NotificationKind {
    #[sea_orm(string_value = "follow")]
    Follow,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "reply")]
    Reply,
    #[sea_orm(string_value = "like")]
    Like,
    #[sea_orm(string_value = "article_rejected")]
    ArticleRejected,
    #[sea_orm(string_value = "article_published")]
    ArticlePublished,
    #[sea_orm(string_value = "other")]
    #[default]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    #[sea_orm(indexed)]
    pub recipient_id: String,

    /// The user who triggered the notification (optional for some kinds)
    #[sea_orm(nullable)]
    pub actor_id: Option<String>,

    /// Notification kind
    pub kind: NotificationKind,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Optional deep link into the frontend.
    #[sea_orm(nullable)]
    pub link: Option<String>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,
}

impl ActiveModelBehavior for ActiveModel {}
