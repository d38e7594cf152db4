//! Engagement repository: likes, bookmarks and reading lists.
//!
//! Every pair table carries a unique (user, target) index, so a raced
//! double-insert fails at the database instead of producing two rows.

use std::sync::Arc;

use crate::entities::{
    article, article_like, bookmark, comment_like, reading_list_entry, ArticleLike, Bookmark,
    CommentLike, ReadingListEntry,
};
use curio_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// Engagement repository for database operations.
#[derive(Clone)]
pub struct EngagementRepository {
    db: Arc<DatabaseConnection>,
}

impl EngagementRepository {
    /// Create a new engagement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Article likes ====================

    /// Whether a user has liked an article.
    pub async fn article_like_exists(&self, article_id: &str, user_id: &str) -> AppResult<bool> {
        let count = ArticleLike::find()
            .filter(article_like::Column::ArticleId.eq(article_id))
            .filter(article_like::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Record an article like.
    pub async fn create_article_like(
        &self,
        model: article_like::ActiveModel,
    ) -> AppResult<article_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove an article like. Returns the affected-row count.
    pub async fn delete_article_like(&self, article_id: &str, user_id: &str) -> AppResult<u64> {
        let result = ArticleLike::delete_many()
            .filter(article_like::Column::ArticleId.eq(article_id))
            .filter(article_like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Total likes received by an author across all their articles
    /// (for badge milestones), counted from the like rows themselves.
    pub async fn count_likes_received(&self, author_id: &str) -> AppResult<u64> {
        ArticleLike::find()
            .join(JoinType::InnerJoin, article_like::Relation::Article.def())
            .filter(article::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Comment likes ====================

    /// Whether a user has liked a comment.
    pub async fn comment_like_exists(&self, comment_id: &str, user_id: &str) -> AppResult<bool> {
        let count = CommentLike::find()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .filter(comment_like::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Record a comment like.
    pub async fn create_comment_like(
        &self,
        model: comment_like::ActiveModel,
    ) -> AppResult<comment_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a comment like. Returns the affected-row count.
    pub async fn delete_comment_like(&self, comment_id: &str, user_id: &str) -> AppResult<u64> {
        let result = CommentLike::delete_many()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .filter(comment_like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    // ==================== Bookmarks ====================

    /// Whether a user has bookmarked an article.
    pub async fn bookmark_exists(&self, article_id: &str, user_id: &str) -> AppResult<bool> {
        let count = Bookmark::find()
            .filter(bookmark::Column::ArticleId.eq(article_id))
            .filter(bookmark::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Record a bookmark.
    pub async fn create_bookmark(
        &self,
        model: bookmark::ActiveModel,
    ) -> AppResult<bookmark::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a bookmark. Returns the affected-row count.
    pub async fn delete_bookmark(&self, article_id: &str, user_id: &str) -> AppResult<u64> {
        let result = Bookmark::delete_many()
            .filter(bookmark::Column::ArticleId.eq(article_id))
            .filter(bookmark::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// A user's bookmarks, newest first.
    pub async fn list_bookmarks(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<bookmark::Model>> {
        Bookmark::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Reading list ====================

    /// Whether an article is already on a user's reading list.
    pub async fn reading_list_entry_exists(
        &self,
        article_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let count = ReadingListEntry::find()
            .filter(reading_list_entry::Column::ArticleId.eq(article_id))
            .filter(reading_list_entry::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Highest position in a user's reading list, if any entries exist.
    pub async fn max_reading_list_position(&self, user_id: &str) -> AppResult<Option<i32>> {
        let last = ReadingListEntry::find()
            .filter(reading_list_entry::Column::UserId.eq(user_id))
            .order_by_desc(reading_list_entry::Column::Position)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(last.map(|e| e.position))
    }

    /// Append an entry to a reading list.
    pub async fn create_reading_list_entry(
        &self,
        model: reading_list_entry::ActiveModel,
    ) -> AppResult<reading_list_entry::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove an entry from a reading list. Returns the affected-row
    /// count.
    pub async fn delete_reading_list_entry(
        &self,
        article_id: &str,
        user_id: &str,
    ) -> AppResult<u64> {
        let result = ReadingListEntry::delete_many()
            .filter(reading_list_entry::Column::ArticleId.eq(article_id))
            .filter(reading_list_entry::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// A user's reading list in position order.
    pub async fn list_reading_list(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<reading_list_entry::Model>> {
        ReadingListEntry::find()
            .filter(reading_list_entry::Column::UserId.eq(user_id))
            .order_by_asc(reading_list_entry::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_article_like_exists() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );

        let repo = EngagementRepository::new(db);
        assert!(repo.article_like_exists("a1", "user1").await.unwrap());
    }

    #[tokio::test]
    async fn test_article_like_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );

        let repo = EngagementRepository::new(db);
        assert!(!repo.article_like_exists("a1", "user1").await.unwrap());
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut map = std::collections::BTreeMap::new();
        map.insert("num_items", sea_orm::Value::BigInt(Some(n)));
        map
    }
}
