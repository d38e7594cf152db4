//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Role {
    #[sea_orm(string_value = "user")]
    #[default]
    User,
    #[sea_orm(string_value = "author")]
    Author,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// Whether this role grants moderation rights.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name
    #[sea_orm(nullable)]
    pub display_name: Option<String>,

    /// Profile description
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    /// Avatar URL
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Role
    pub role: Role,

    /// Banned users keep their data but cannot perform mutating actions.
    #[sea_orm(default_value = false)]
    pub is_banned: bool,

    /// Deactivated accounts cannot log in.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// Published articles count (denormalized, display only)
    #[sea_orm(default_value = 0)]
    pub article_count: i32,

    /// Followers count (denormalized, display only)
    #[sea_orm(default_value = 0)]
    pub follower_count: i32,

    /// Following count (denormalized, display only)
    #[sea_orm(default_value = 0)]
    pub following_count: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::article::Entity")]
    Articles,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    #[sea_orm(has_one = "super::author_profile::Entity")]
    AuthorProfile,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl Related<super::author_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthorProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Author.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_role_serde_is_closed() {
        let role: Role = serde_json::from_str("\"author\"").unwrap();
        assert_eq!(role, Role::Author);
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }
}
