//! Article repository.
//!
//! Lifecycle transitions are single conditional UPDATE statements guarded
//! on the current status; callers inspect the affected-row count instead
//! of racing a separate existence check.

use std::sync::Arc;

use crate::entities::{article, article_tag, Article, ArticleTag};
use curio_common::{AppError, AppResult};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

pub use crate::entities::article::ArticleStatus;

/// Article repository for database operations.
#[derive(Clone)]
pub struct ArticleRepository {
    db: Arc<DatabaseConnection>,
}

impl ArticleRepository {
    /// Create a new article repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an article by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<article::Model>> {
        Article::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an article by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<article::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound(id.to_string()))
    }

    /// Find an article by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<article::Model>> {
        Article::find()
            .filter(article::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a slug is already taken.
    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        let count = Article::find()
            .filter(article::Column::Slug.eq(slug))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a new article.
    pub async fn create(&self, model: article::ActiveModel) -> AppResult<article::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an article.
    pub async fn update(&self, model: article::ActiveModel) -> AppResult<article::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an article.
    ///
    /// Comments, likes, bookmarks, reading-list entries, reports and tag
    /// associations go with it via `ON DELETE CASCADE`.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Article::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ==================== Lifecycle transitions ====================

    /// `draft -> pending`, owner only. Returns the affected-row count.
    pub async fn submit_if_draft(&self, id: &str, author_id: &str) -> AppResult<u64> {
        let result = Article::update_many()
            .col_expr(article::Column::Status, ArticleStatus::Pending.into())
            .col_expr(
                article::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(article::Column::Id.eq(id))
            .filter(article::Column::Status.eq(ArticleStatus::Draft))
            .filter(article::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// `pending -> published`. Sets `published_at` only when it is still
    /// NULL, so re-approval never resets the original publish date.
    /// Returns the affected-row count.
    pub async fn publish_if_pending(&self, id: &str, reviewer_id: &str) -> AppResult<u64> {
        let now = chrono::Utc::now();
        let result = Article::update_many()
            .col_expr(article::Column::Status, ArticleStatus::Published.into())
            .col_expr(
                article::Column::PublishedAt,
                Expr::cust_with_values("COALESCE(published_at, ?)", [now]),
            )
            .col_expr(article::Column::ReviewedBy, Expr::value(reviewer_id))
            .col_expr(article::Column::ReviewedAt, Expr::value(now))
            .filter(article::Column::Id.eq(id))
            .filter(article::Column::Status.eq(ArticleStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// `pending -> rejected` with the stored reason. Returns the
    /// affected-row count.
    pub async fn reject_if_pending(
        &self,
        id: &str,
        reviewer_id: &str,
        reason: &str,
    ) -> AppResult<u64> {
        let now = chrono::Utc::now();
        let result = Article::update_many()
            .col_expr(article::Column::Status, ArticleStatus::Rejected.into())
            .col_expr(article::Column::RejectionReason, Expr::value(reason))
            .col_expr(article::Column::ReviewedBy, Expr::value(reviewer_id))
            .col_expr(article::Column::ReviewedAt, Expr::value(now))
            .filter(article::Column::Id.eq(id))
            .filter(article::Column::Status.eq(ArticleStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Move between `published` and `archived`. Returns the affected-row
    /// count. `published_at` is left untouched in both directions.
    pub async fn set_status_if(
        &self,
        id: &str,
        from: ArticleStatus,
        to: ArticleStatus,
    ) -> AppResult<u64> {
        let result = Article::update_many()
            .col_expr(article::Column::Status, to.into())
            .col_expr(
                article::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(article::Column::Id.eq(id))
            .filter(article::Column::Status.eq(from))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Toggle the featured flag; only legal while published. Returns the
    /// affected-row count.
    pub async fn set_featured_if_published(&self, id: &str, featured: bool) -> AppResult<u64> {
        let result = Article::update_many()
            .col_expr(article::Column::IsFeatured, Expr::value(featured))
            .filter(article::Column::Id.eq(id))
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    // ==================== Counters ====================

    /// Increment the view count atomically; only published articles count
    /// views.
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        Article::update_many()
            .col_expr(
                article::Column::ViewCount,
                Expr::col(article::Column::ViewCount).add(1),
            )
            .filter(article::Column::Id.eq(id))
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Adjust the like count atomically, floored at zero.
    pub async fn adjust_like_count(&self, id: &str, delta: i32) -> AppResult<()> {
        let expr = if delta >= 0 {
            Expr::col(article::Column::LikeCount).add(delta)
        } else {
            Expr::cust("GREATEST(like_count - 1, 0)")
        };
        Article::update_many()
            .col_expr(article::Column::LikeCount, expr)
            .filter(article::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Adjust the comment count atomically, floored at zero.
    pub async fn adjust_comment_count(&self, id: &str, delta: i32) -> AppResult<()> {
        let expr = if delta >= 0 {
            Expr::col(article::Column::CommentCount).add(delta)
        } else {
            Expr::cust("GREATEST(comment_count - 1, 0)")
        };
        Article::update_many()
            .col_expr(article::Column::CommentCount, expr)
            .filter(article::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ==================== Listings ====================

    /// Published articles, newest publication first.
    pub async fn list_published(
        &self,
        category_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        let mut query = Article::find()
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .order_by_desc(article::Column::PublishedAt);

        if let Some(category) = category_id {
            query = query.filter(article::Column::CategoryId.eq(category));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published articles carrying a tag, newest publication first.
    pub async fn list_published_tagged(
        &self,
        tag_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        let links = ArticleTag::find()
            .filter(article_tag::Column::TagId.eq(tag_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let ids: Vec<String> = links.into_iter().map(|l| l.article_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Article::find()
            .filter(article::Column::Id.is_in(ids))
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .order_by_desc(article::Column::PublishedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Featured published articles.
    pub async fn list_featured(&self, limit: u64) -> AppResult<Vec<article::Model>> {
        Article::find()
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .filter(article::Column::IsFeatured.eq(true))
            .order_by_desc(article::Column::PublishedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// An author's published articles, newest publication first.
    pub async fn list_published_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        Article::find()
            .filter(article::Column::AuthorId.eq(author_id))
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .order_by_desc(article::Column::PublishedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All articles by an author, newest first (any status).
    pub async fn list_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        Article::find()
            .filter(article::Column::AuthorId.eq(author_id))
            .order_by_desc(article::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Review queue: pending articles, oldest submission first.
    pub async fn list_pending(&self, limit: u64, offset: u64) -> AppResult<Vec<article::Model>> {
        Article::find()
            .filter(article::Column::Status.eq(ArticleStatus::Pending))
            .order_by_asc(article::Column::UpdatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending articles.
    pub async fn count_pending(&self) -> AppResult<u64> {
        Article::find()
            .filter(article::Column::Status.eq(ArticleStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count published articles by an author (for badge milestones).
    pub async fn count_published_by_author(&self, author_id: &str) -> AppResult<u64> {
        Article::find()
            .filter(article::Column::AuthorId.eq(author_id))
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Tags ====================

    /// Replace the tag associations for an article.
    pub async fn set_tags(&self, article_id: &str, tag_ids: &[String]) -> AppResult<()> {
        ArticleTag::delete_many()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        let models: Vec<article_tag::ActiveModel> = tag_ids
            .iter()
            .map(|tag_id| article_tag::ActiveModel {
                article_id: Set(article_id.to_string()),
                tag_id: Set(tag_id.clone()),
            })
            .collect();

        ArticleTag::insert_many(models)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Tag IDs associated with an article.
    pub async fn tag_ids(&self, article_id: &str) -> AppResult<Vec<String>> {
        let rows = ArticleTag::find()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|r| r.tag_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_article(id: &str, status: ArticleStatus) -> article::Model {
        article::Model {
            id: id.to_string(),
            author_id: "author1".to_string(),
            category_id: None,
            title: "Test Article".to_string(),
            slug: format!("test-article-{id}"),
            excerpt: None,
            body: "Body".to_string(),
            featured_image_url: None,
            status,
            rejection_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            is_featured: false,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            published_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let article = create_test_article("a1", ArticleStatus::Published);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[article]])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db);
        let result = repo.get_by_id("a1").await.unwrap();

        assert_eq!(result.id, "a1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<article::Model>::new()])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::ArticleNotFound(_))));
    }

    #[tokio::test]
    async fn test_publish_if_pending_reports_rows_affected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db);
        let rows = repo.publish_if_pending("a1", "admin1").await.unwrap();

        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_publish_if_pending_keeps_existing_published_at() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db.clone());
        repo.publish_if_pending("a1", "admin1").await.unwrap();

        // The UPDATE must coalesce published_at so a second approval
        // after an archive round-trip keeps the original publish date.
        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let update = format!("{log:?}");
        assert!(update.contains("COALESCE(published_at"));
    }

    #[tokio::test]
    async fn test_publish_if_pending_zero_rows_when_not_pending() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db);
        let rows = repo.publish_if_pending("a1", "admin1").await.unwrap();

        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_list_pending() {
        let articles = vec![
            create_test_article("a1", ArticleStatus::Pending),
            create_test_article("a2", ArticleStatus::Pending),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([articles])
                .into_connection(),
        );

        let repo = ArticleRepository::new(db);
        let result = repo.list_pending(10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
