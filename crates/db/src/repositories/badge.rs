//! Badge repository.

use std::sync::Arc;

use crate::entities::{badge, user_badge, Badge, UserBadge};
use curio_common::{AppError, AppResult};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

/// Badge repository for database operations.
#[derive(Clone)]
pub struct BadgeRepository {
    db: Arc<DatabaseConnection>,
}

impl BadgeRepository {
    /// Create a new badge repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All badge definitions, lowest threshold first.
    pub async fn list(&self) -> AppResult<Vec<badge::Model>> {
        Badge::find()
            .order_by_asc(badge::Column::Threshold)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Badge definitions for one milestone kind.
    pub async fn list_by_kind(&self, kind: badge::BadgeKind) -> AppResult<Vec<badge::Model>> {
        Badge::find()
            .filter(badge::Column::Kind.eq(kind))
            .order_by_asc(badge::Column::Threshold)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Award a badge to a user. Idempotent: the composite primary key
    /// plus `ON CONFLICT DO NOTHING` makes a repeat award a no-op.
    pub async fn award(&self, user_id: &str, badge_id: &str) -> AppResult<()> {
        let model = user_badge::ActiveModel {
            user_id: Set(user_id.to_string()),
            badge_id: Set(badge_id.to_string()),
            awarded_at: Set(chrono::Utc::now().into()),
        };

        UserBadge::insert(model)
            .on_conflict(
                OnConflict::columns([user_badge::Column::UserId, user_badge::Column::BadgeId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Badges a user has earned, most recent first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<user_badge::Model>> {
        UserBadge::find()
            .filter(user_badge::Column::UserId.eq(user_id))
            .order_by_desc(user_badge::Column::AwardedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Badge definitions for a set of IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<badge::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Badge::find()
            .filter(badge::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(badge::Column::Threshold)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::badge::BadgeKind;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_badge(id: &str, kind: BadgeKind, threshold: i32) -> badge::Model {
        badge::Model {
            id: id.to_string(),
            name: format!("badge-{id}"),
            description: "A milestone".to_string(),
            icon: None,
            kind,
            threshold,
        }
    }

    #[tokio::test]
    async fn test_list_by_kind_orders_by_threshold() {
        let badges = vec![
            create_test_badge("b1", BadgeKind::Publications, 1),
            create_test_badge("b2", BadgeKind::Publications, 10),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([badges])
                .into_connection(),
        );

        let repo = BadgeRepository::new(db);
        let result = repo.list_by_kind(BadgeKind::Publications).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result[0].threshold <= result[1].threshold);
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let repo = BadgeRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }
}
