//! Report repository.
//!
//! Covers both report tables. Open-report counts are always computed
//! from the rows themselves, never from a stored counter.

use std::sync::Arc;

use crate::entities::{article_report, comment_report, user, ArticleReport, CommentReport};
use curio_common::{AppError, AppResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// One target with its aggregated report figures: id, latest report
/// time, open-report count.
pub type ReportSummary = (String, DateTimeWithTimeZone, i64);

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Article reports ====================

    /// File a report against an article. The unique (article, reporter)
    /// index rejects duplicates at the database.
    pub async fn create_article_report(
        &self,
        model: article_report::ActiveModel,
    ) -> AppResult<article_report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// An existing report by this reporter against this article, if any.
    pub async fn find_article_report_by_pair(
        &self,
        article_id: &str,
        reporter_id: &str,
    ) -> AppResult<Option<article_report::Model>> {
        ArticleReport::find()
            .filter(article_report::Column::ArticleId.eq(article_id))
            .filter(article_report::Column::ReporterId.eq(reporter_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All reports against one article with the reporting users, oldest
    /// first.
    pub async fn list_article_reports(
        &self,
        article_id: &str,
    ) -> AppResult<Vec<(article_report::Model, Option<user::Model>)>> {
        ArticleReport::find()
            .filter(article_report::Column::ArticleId.eq(article_id))
            .find_also_related(user::Entity)
            .order_by_asc(article_report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reported articles for the moderation queue, aggregated per
    /// article and paged per article. Counts come straight out of the
    /// GROUP BY, so a page boundary can never truncate them.
    pub async fn article_report_summaries(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ReportSummary>> {
        ArticleReport::find()
            .select_only()
            .column(article_report::Column::ArticleId)
            .column_as(article_report::Column::CreatedAt.max(), "latest_report_at")
            .column_as(article_report::Column::Id.count(), "report_count")
            .group_by(article_report::Column::ArticleId)
            .order_by_desc(article_report::Column::Id.count())
            .order_by_desc(article_report::Column::CreatedAt.max())
            .offset(offset)
            .limit(limit)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count open reports against one article.
    pub async fn count_article_reports(&self, article_id: &str) -> AppResult<u64> {
        ArticleReport::find()
            .filter(article_report::Column::ArticleId.eq(article_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Dismiss a single article report.
    pub async fn delete_article_report(&self, id: &str) -> AppResult<u64> {
        let result = ArticleReport::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Dismiss every report against an article at once.
    pub async fn delete_article_reports(&self, article_id: &str) -> AppResult<u64> {
        let result = ArticleReport::delete_many()
            .filter(article_report::Column::ArticleId.eq(article_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    // ==================== Comment reports ====================

    /// File a report against a comment. The unique (comment, reporter)
    /// index rejects duplicates at the database.
    pub async fn create_comment_report(
        &self,
        model: comment_report::ActiveModel,
    ) -> AppResult<comment_report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment report by ID.
    pub async fn find_comment_report(
        &self,
        id: &str,
    ) -> AppResult<Option<comment_report::Model>> {
        CommentReport::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// An existing report by this reporter against this comment, if any.
    pub async fn find_comment_report_by_pair(
        &self,
        comment_id: &str,
        reporter_id: &str,
    ) -> AppResult<Option<comment_report::Model>> {
        CommentReport::find()
            .filter(comment_report::Column::CommentId.eq(comment_id))
            .filter(comment_report::Column::ReporterId.eq(reporter_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All reports against one comment with the reporting users, oldest
    /// first.
    pub async fn list_comment_reports(
        &self,
        comment_id: &str,
    ) -> AppResult<Vec<(comment_report::Model, Option<user::Model>)>> {
        CommentReport::find()
            .filter(comment_report::Column::CommentId.eq(comment_id))
            .find_also_related(user::Entity)
            .order_by_asc(comment_report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reported comments for the moderation queue, aggregated per
    /// comment and paged per comment.
    pub async fn comment_report_summaries(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ReportSummary>> {
        CommentReport::find()
            .select_only()
            .column(comment_report::Column::CommentId)
            .column_as(comment_report::Column::CreatedAt.max(), "latest_report_at")
            .column_as(comment_report::Column::Id.count(), "report_count")
            .group_by(comment_report::Column::CommentId)
            .order_by_desc(comment_report::Column::Id.count())
            .order_by_desc(comment_report::Column::CreatedAt.max())
            .offset(offset)
            .limit(limit)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count open reports against one comment.
    pub async fn count_comment_reports(&self, comment_id: &str) -> AppResult<u64> {
        CommentReport::find()
            .filter(comment_report::Column::CommentId.eq(comment_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Dismiss a single comment report.
    pub async fn delete_comment_report(&self, id: &str) -> AppResult<u64> {
        let result = CommentReport::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Dismiss every report against a comment at once.
    pub async fn delete_comment_reports(&self, comment_id: &str) -> AppResult<u64> {
        let result = CommentReport::delete_many()
            .filter(comment_report::Column::CommentId.eq(comment_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_report(id: &str, article_id: &str, reporter_id: &str) -> article_report::Model {
        article_report::Model {
            id: id.to_string(),
            article_id: article_id.to_string(),
            reporter_id: reporter_id.to_string(),
            reason: "spam".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_article_report_by_pair() {
        let report = create_test_report("r1", "a1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.find_article_report_by_pair("a1", "user1").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_find_article_report_by_pair_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<article_report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.find_article_report_by_pair("a1", "user1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_article_report_summaries_parses_grouped_rows() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut row = std::collections::BTreeMap::new();
        row.insert("article_id", sea_orm::Value::from("a1"));
        row.insert("latest_report_at", sea_orm::Value::from(now));
        row.insert("report_count", sea_orm::Value::BigInt(Some(3)));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let summaries = repo.article_report_summaries(20, 0).await.unwrap();

        assert_eq!(summaries, vec![("a1".to_string(), now, 3)]);
    }

    #[tokio::test]
    async fn test_comment_report_summaries_parses_grouped_rows() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut row = std::collections::BTreeMap::new();
        row.insert("comment_id", sea_orm::Value::from("c1"));
        row.insert("latest_report_at", sea_orm::Value::from(now));
        row.insert("report_count", sea_orm::Value::BigInt(Some(2)));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let summaries = repo.comment_report_summaries(20, 0).await.unwrap();

        assert_eq!(summaries, vec![("c1".to_string(), now, 2)]);
    }
}
