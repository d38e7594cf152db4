//! Report service: filing and aggregating content reports.
//!
//! Counts shown to moderators are always computed live from the report
//! rows with a GROUP BY in the repository; there is no cached
//! report-count column to drift out of date, and pagination runs per
//! reported target so a page boundary never splits one target's
//! reports.

use crate::services::user::ensure_admin;
use curio_common::{AppError, AppResult, IdGenerator};
use curio_db::{
    entities::{article, article_report, comment, comment_report, user},
    repositories::{ArticleRepository, CommentRepository, ReportRepository},
};
use chrono::{DateTime, FixedOffset};
use sea_orm::Set;
use serde::Serialize;

/// One report row as shown to moderators.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub id: String,
    pub reason: String,
    pub reporter_id: String,
    pub reporter_username: Option<String>,
    pub reported_at: DateTime<FixedOffset>,
}

/// An article with its open reports.
#[derive(Debug, Clone, Serialize)]
pub struct ReportedArticle {
    pub article: article::Model,
    pub report_count: u64,
    pub latest_report_at: DateTime<FixedOffset>,
    pub reports: Vec<ReportEntry>,
}

/// A comment with its open reports.
#[derive(Debug, Clone, Serialize)]
pub struct ReportedComment {
    pub comment: comment::Model,
    pub report_count: u64,
    pub latest_report_at: DateTime<FixedOffset>,
    pub reports: Vec<ReportEntry>,
}

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    article_repo: ArticleRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        article_repo: ArticleRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            report_repo,
            article_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Filing ==========

    /// Report an article.
    pub async fn report_article(
        &self,
        reporter: &user::Model,
        article_id: &str,
        reason: &str,
    ) -> AppResult<article_report::Model> {
        let reason = validate_reason(reason)?;

        let article = self.article_repo.get_by_id(article_id).await?;
        if article.author_id == reporter.id {
            return Err(AppError::Validation(
                "Cannot report your own article".to_string(),
            ));
        }

        if self
            .report_repo
            .find_article_report_by_pair(article_id, &reporter.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You already reported this article".to_string(),
            ));
        }

        let model = article_report::ActiveModel {
            id: Set(self.id_gen.generate()),
            article_id: Set(article_id.to_string()),
            reporter_id: Set(reporter.id.clone()),
            reason: Set(reason),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.report_repo
            .create_article_report(model)
            .await
            .map_err(|e| map_duplicate(e, "You already reported this article"))
    }

    /// Report a comment. Also raises the comment's `is_reported` marker.
    pub async fn report_comment(
        &self,
        reporter: &user::Model,
        comment_id: &str,
        reason: &str,
    ) -> AppResult<comment_report::Model> {
        let reason = validate_reason(reason)?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        if comment.author_id == reporter.id {
            return Err(AppError::Validation(
                "Cannot report your own comment".to_string(),
            ));
        }

        if self
            .report_repo
            .find_comment_report_by_pair(comment_id, &reporter.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You already reported this comment".to_string(),
            ));
        }

        let model = comment_report::ActiveModel {
            id: Set(self.id_gen.generate()),
            comment_id: Set(comment_id.to_string()),
            reporter_id: Set(reporter.id.clone()),
            reason: Set(reason),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self
            .report_repo
            .create_comment_report(model)
            .await
            .map_err(|e| map_duplicate(e, "You already reported this comment"))?;

        self.comment_repo.set_reported(comment_id, true).await?;

        Ok(created)
    }

    // ========== Moderation views ==========

    /// Every article with at least one open report, most-reported first.
    pub async fn list_reported_articles(
        &self,
        admin: &user::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ReportedArticle>> {
        ensure_admin(admin)?;

        let summaries = self
            .report_repo
            .article_report_summaries(limit, offset)
            .await?;

        let mut out = Vec::with_capacity(summaries.len());
        for (article_id, latest, count) in summaries {
            let Some(article) = self.article_repo.find_by_id(&article_id).await? else {
                continue;
            };
            let rows = self.report_repo.list_article_reports(&article_id).await?;
            out.push(ReportedArticle {
                article,
                report_count: u64::try_from(count).unwrap_or(0),
                latest_report_at: latest,
                reports: rows
                    .iter()
                    .map(|(report, reporter)| to_entry_article(report, reporter.as_ref()))
                    .collect(),
            });
        }

        Ok(out)
    }

    /// Every comment with at least one open report, most-reported first.
    pub async fn list_reported_comments(
        &self,
        admin: &user::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<ReportedComment>> {
        ensure_admin(admin)?;

        let summaries = self
            .report_repo
            .comment_report_summaries(limit, offset)
            .await?;

        let mut out = Vec::with_capacity(summaries.len());
        for (comment_id, latest, count) in summaries {
            let Some(comment) = self.comment_repo.find_by_id(&comment_id).await? else {
                continue;
            };
            let rows = self.report_repo.list_comment_reports(&comment_id).await?;
            out.push(ReportedComment {
                comment,
                report_count: u64::try_from(count).unwrap_or(0),
                latest_report_at: latest,
                reports: rows
                    .iter()
                    .map(|(report, reporter)| to_entry_comment(report, reporter.as_ref()))
                    .collect(),
            });
        }

        Ok(out)
    }

    /// Reports against one article, oldest first.
    pub async fn reports_for_article(
        &self,
        admin: &user::Model,
        article_id: &str,
    ) -> AppResult<Vec<ReportEntry>> {
        ensure_admin(admin)?;
        let rows = self.report_repo.list_article_reports(article_id).await?;
        Ok(rows
            .into_iter()
            .map(|(report, reporter)| to_entry_article(&report, reporter.as_ref()))
            .collect())
    }

    // ========== Dismissal ==========

    /// Dismiss one article report; the article itself is untouched.
    pub async fn dismiss_article_report(
        &self,
        admin: &user::Model,
        report_id: &str,
    ) -> AppResult<()> {
        ensure_admin(admin)?;
        let rows = self.report_repo.delete_article_report(report_id).await?;
        if rows == 0 {
            return Err(AppError::NotFound(format!("Report not found: {report_id}")));
        }
        Ok(())
    }

    /// Dismiss one comment report, lowering `is_reported` when it was
    /// the last one.
    pub async fn dismiss_comment_report(
        &self,
        admin: &user::Model,
        report_id: &str,
    ) -> AppResult<()> {
        ensure_admin(admin)?;

        let report = self
            .report_repo
            .find_comment_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report not found: {report_id}")))?;
        let comment_id = report.comment_id;

        let deleted = self.report_repo.delete_comment_report(report_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Report not found: {report_id}")));
        }

        if self.report_repo.count_comment_reports(&comment_id).await? == 0 {
            self.comment_repo.set_reported(&comment_id, false).await?;
        }
        Ok(())
    }

    /// Dismiss every report against an article.
    pub async fn dismiss_all_for_article(
        &self,
        admin: &user::Model,
        article_id: &str,
    ) -> AppResult<u64> {
        ensure_admin(admin)?;
        self.report_repo.delete_article_reports(article_id).await
    }

    /// Dismiss every report against a comment and clear its marker.
    pub async fn dismiss_all_for_comment(
        &self,
        admin: &user::Model,
        comment_id: &str,
    ) -> AppResult<u64> {
        ensure_admin(admin)?;
        let deleted = self.report_repo.delete_comment_reports(comment_id).await?;
        self.comment_repo.set_reported(comment_id, false).await?;
        Ok(deleted)
    }
}

fn validate_reason(reason: &str) -> AppResult<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("Report reason is required".to_string()));
    }
    if reason.len() > 2000 {
        return Err(AppError::Validation("Report reason too long".to_string()));
    }
    Ok(reason.to_string())
}

/// Map a unique-index violation to Conflict; the pre-insert lookup can
/// lose a race with a concurrent duplicate.
fn map_duplicate(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Database(ref detail)
            if detail.contains("duplicate key") || detail.contains("unique constraint") =>
        {
            AppError::Conflict(message.to_string())
        }
        other => other,
    }
}

fn to_entry_article(
    report: &article_report::Model,
    reporter: Option<&user::Model>,
) -> ReportEntry {
    ReportEntry {
        id: report.id.clone(),
        reason: report.reason.clone(),
        reporter_id: report.reporter_id.clone(),
        reporter_username: reporter.map(|u| u.username.clone()),
        reported_at: report.created_at,
    }
}

fn to_entry_comment(
    report: &comment_report::Model,
    reporter: Option<&user::Model>,
) -> ReportEntry {
    ReportEntry {
        id: report.id.clone(),
        reason: report.reason.clone(),
        reporter_id: report.reporter_id.clone(),
        reporter_username: reporter.map(|u| u.username.clone()),
        reported_at: report.created_at,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use curio_db::entities::{article::ArticleStatus, user::Role};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            username: id.to_string(),
            username_lower: id.to_lowercase(),
            password_hash: "hash".to_string(),
            display_name: None,
            bio: None,
            avatar_url: None,
            role,
            is_banned: false,
            is_active: true,
            article_count: 0,
            follower_count: 0,
            following_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_article(id: &str, author_id: &str) -> article::Model {
        article::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            category_id: None,
            title: "Title".to_string(),
            slug: format!("title-{id}"),
            excerpt: None,
            body: "Body".to_string(),
            featured_image_url: None,
            status: ArticleStatus::Published,
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

    fn report_row(
        id: &str,
        article_id: &str,
        reporter: &str,
        minutes_ago: i64,
    ) -> (article_report::Model, user::Model) {
        let report = article_report::Model {
            id: id.to_string(),
            article_id: article_id.to_string(),
            reporter_id: reporter.to_string(),
            reason: "spam".to_string(),
            created_at: (Utc::now() - Duration::minutes(minutes_ago)).into(),
        };
        (report, test_user(reporter, Role::User))
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> ReportService {
        ReportService::new(
            ReportRepository::new(db.clone()),
            ArticleRepository::new(db.clone()),
            CommentRepository::new(db),
        )
    }

    #[test]
    fn test_validate_reason() {
        assert!(validate_reason("  ").is_err());
        assert_eq!(validate_reason("  spam  ").unwrap(), "spam");
        assert!(validate_reason(&"x".repeat(2001)).is_err());
    }

    #[test]
    fn test_duplicate_key_maps_to_conflict() {
        let err = AppError::Database(
            "duplicate key value violates unique constraint \"idx_article_report_unique_pair\""
                .to_string(),
        );
        assert!(matches!(
            map_duplicate(err, "dup"),
            AppError::Conflict(_)
        ));

        let other = AppError::Database("connection reset".to_string());
        assert!(matches!(map_duplicate(other, "dup"), AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_list_reported_articles_keeps_full_counts_on_a_small_page() {
        // A page of one article: the aggregate row says three reports,
        // and all three report rows come back with it even though the
        // page size is one.
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let mut summary = std::collections::BTreeMap::new();
        summary.insert("article_id", sea_orm::Value::from("a1"));
        summary.insert("latest_report_at", sea_orm::Value::from(now));
        summary.insert("report_count", sea_orm::Value::BigInt(Some(3)));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[summary]])
                .append_query_results([[test_article("a1", "author1")]])
                .append_query_results([vec![
                    report_row("r1", "a1", "u1", 30),
                    report_row("r2", "a1", "u2", 20),
                    report_row("r3", "a1", "u3", 10),
                ]])
                .into_connection(),
        );

        let svc = service(db);
        let admin = test_user("admin1", Role::Admin);

        let reported = svc.list_reported_articles(&admin, 1, 0).await.unwrap();

        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].article.id, "a1");
        assert_eq!(reported[0].report_count, 3);
        assert_eq!(reported[0].reports.len(), 3);
        assert_eq!(
            reported[0].reports[0].reporter_username.as_deref(),
            Some("u1")
        );
    }

    #[tokio::test]
    async fn test_dismiss_all_for_comment_clears_reported_marker() {
        use sea_orm::MockExecResult;

        // Exec queue: bulk report delete, then the is_reported UPDATE.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let svc = service(db.clone());
        let admin = test_user("admin1", Role::Admin);

        let deleted = svc.dismiss_all_for_comment(&admin, "c1").await.unwrap();
        assert_eq!(deleted, 2);

        drop(svc);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let statements = format!("{log:?}");
        assert!(statements.contains("is_reported"));
        assert!(statements.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn test_list_reported_articles_requires_admin() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service(db);
        let reader = test_user("reader", Role::User);

        let result = svc.list_reported_articles(&reader, 20, 0).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
