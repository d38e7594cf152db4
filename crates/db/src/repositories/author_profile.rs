//! Author profile repository.

use std::sync::Arc;

use crate::entities::{author_profile, AuthorProfile};
use curio_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

pub use crate::entities::author_profile::AuthorStatus;

/// Author profile repository for database operations.
#[derive(Clone)]
pub struct AuthorProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl AuthorProfileRepository {
    /// Create a new author profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by the owning user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Option<author_profile::Model>> {
        AuthorProfile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by the owning user, returning an error if absent.
    pub async fn get_by_user(&self, user_id: &str) -> AppResult<author_profile::Model> {
        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author profile not found: {user_id}")))
    }

    /// Create an application.
    pub async fn create(
        &self,
        model: author_profile::ActiveModel,
    ) -> AppResult<author_profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a profile.
    pub async fn update(
        &self,
        model: author_profile::ActiveModel,
    ) -> AppResult<author_profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a profile (rejected applications can be refiled).
    pub async fn delete(&self, user_id: &str) -> AppResult<()> {
        AuthorProfile::delete_by_id(user_id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Pending applications, oldest first (the review queue).
    pub async fn list_pending(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<author_profile::Model>> {
        AuthorProfile::find()
            .filter(author_profile::Column::AuthorStatus.eq(AuthorStatus::Pending))
            .order_by_asc(author_profile::Column::AppliedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending applications.
    pub async fn count_pending(&self) -> AppResult<u64> {
        AuthorProfile::find()
            .filter(author_profile::Column::AuthorStatus.eq(AuthorStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_profile(user_id: &str, status: AuthorStatus) -> author_profile::Model {
        author_profile::Model {
            user_id: user_id.to_string(),
            author_status: status,
            pen_name: None,
            website: None,
            applied_at: Utc::now().into(),
            reviewed_by: None,
            reviewed_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_user() {
        let profile = create_test_profile("user1", AuthorStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile]])
                .into_connection(),
        );

        let repo = AuthorProfileRepository::new(db);
        let result = repo.get_by_user("user1").await.unwrap();

        assert_eq!(result.author_status, AuthorStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_by_user_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<author_profile::Model>::new()])
                .into_connection(),
        );

        let repo = AuthorProfileRepository::new(db);
        let result = repo.get_by_user("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
