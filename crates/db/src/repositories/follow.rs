//! Follow repository.

use std::sync::Arc;

use crate::entities::{follow, Follow};
use curio_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Whether `follower_id` follows `followee_id`.
    pub async fn exists(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let count = Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Record a follow. The unique (follower, followee) index rejects
    /// duplicates at the database.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a follow. Returns the affected-row count.
    pub async fn delete(&self, follower_id: &str, followee_id: &str) -> AppResult<u64> {
        let result = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Users following `user_id`, newest first.
    pub async fn list_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FolloweeId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users `user_id` follows, newest first.
    pub async fn list_following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of everyone following `user_id`, for notification fan-out.
    pub async fn follower_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let rows = Follow::find()
            .filter(follow::Column::FolloweeId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|f| f.follower_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_follow(id: &str, follower: &str, followee: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower.to_string(),
            followee_id: followee.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_follower_ids() {
        let rows = vec![
            create_test_follow("f1", "user1", "author1"),
            create_test_follow("f2", "user2", "author1"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        let ids = repo.follower_ids("author1").await.unwrap();

        assert_eq!(ids, vec!["user1".to_string(), "user2".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_follow_affects_no_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        let rows = repo.delete("user1", "author1").await.unwrap();

        assert_eq!(rows, 0);
    }
}
