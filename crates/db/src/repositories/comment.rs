//! Comment repository.

use std::sync::Arc;

use crate::entities::{comment, Comment};
use curio_common::{AppError, AppResult};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {id}")))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment. Replies and likes cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Approved comments on an article, oldest first.
    pub async fn list_by_article(
        &self,
        article_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ArticleId.eq(article_id))
            .filter(comment::Column::IsApproved.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comments written by a user, newest first.
    pub async fn list_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::AuthorId.eq(author_id))
            .order_by_desc(comment::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count approved comments on an article.
    pub async fn count_by_article(&self, article_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::ArticleId.eq(article_id))
            .filter(comment::Column::IsApproved.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set or clear the approved flag.
    pub async fn set_approved(&self, id: &str, approved: bool) -> AppResult<()> {
        Comment::update_many()
            .col_expr(comment::Column::IsApproved, Expr::value(approved))
            .filter(comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Set or clear the open-report marker.
    pub async fn set_reported(&self, id: &str, reported: bool) -> AppResult<()> {
        Comment::update_many()
            .col_expr(comment::Column::IsReported, Expr::value(reported))
            .filter(comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Adjust the like count atomically, floored at zero.
    pub async fn adjust_like_count(&self, id: &str, delta: i32) -> AppResult<()> {
        let expr = if delta >= 0 {
            Expr::col(comment::Column::LikeCount).add(delta)
        } else {
            Expr::cust("GREATEST(like_count - 1, 0)")
        };
        Comment::update_many()
            .col_expr(comment::Column::LikeCount, expr)
            .filter(comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_comment(id: &str, article_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            article_id: article_id.to_string(),
            author_id: "user1".to_string(),
            parent_id: None,
            content: "Nice write-up".to_string(),
            is_approved: true,
            is_reported: false,
            like_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let comment = create_test_comment("c1", "a1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.get_by_id("c1").await.unwrap();

        assert_eq!(result.article_id, "a1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_by_article() {
        let comments = vec![
            create_test_comment("c1", "a1"),
            create_test_comment("c2", "a1"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([comments])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.list_by_article("a1", 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
