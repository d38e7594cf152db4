//! Article entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Article lifecycle states.
///
/// Legal transitions: `draft -> pending` (author submit),
/// `pending -> published` (admin approve), `pending -> rejected`
/// (admin reject with reason), `published <-> archived`, and editing a
/// rejected article returns it to `draft`. No other value is ever
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ArticleStatus {
    #[sea_orm(string_value = "draft")]
    #[default]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl ArticleStatus {
    /// Whether the article is visible to requesters other than its
    /// author and admins.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Published)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "article")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub author_id: String,

    #[sea_orm(nullable, indexed)]
    pub category_id: Option<String>,

    pub title: String,

    /// Globally unique, URL-safe slug.
    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    #[sea_orm(nullable)]
    pub featured_image_url: Option<String>,

    /// Lifecycle status
    pub status: ArticleStatus,

    /// Reason given on rejection.
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,

    /// Admin who approved or rejected the article.
    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    /// Featured articles surface on the front page; only legal while
    /// published.
    #[sea_orm(default_value = false)]
    pub is_featured: bool,

    /// View count; never decrements.
    #[sea_orm(default_value = 0)]
    pub view_count: i32,

    /// Like count (denormalized)
    #[sea_orm(default_value = 0)]
    pub like_count: i32,

    /// Comment count (denormalized)
    #[sea_orm(default_value = 0)]
    pub comment_count: i32,

    /// Set exactly once, when the article first becomes published.
    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,

    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::article_report::Entity")]
    Reports,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_published_is_public() {
        assert!(ArticleStatus::Published.is_public());
        for status in [
            ArticleStatus::Draft,
            ArticleStatus::Pending,
            ArticleStatus::Rejected,
            ArticleStatus::Archived,
        ] {
            assert!(!status.is_public());
        }
    }
}
