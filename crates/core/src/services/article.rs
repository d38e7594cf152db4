//! Article service: the publication lifecycle.
//!
//! Transitions run as conditional UPDATEs in the repository; when zero
//! rows change, the article is re-read once to tell NotFound, Forbidden
//! and Conflict apart. Between the UPDATE and the re-read another writer
//! may move the article again, but the UPDATE itself can never fire
//! twice for the same transition.

use crate::services::{BadgeService, NotificationService, NotifyInput};
use curio_common::{slugify, slugify_unique, AppError, AppResult, IdGenerator};
use curio_db::{
    entities::{
        article::{self, ArticleStatus},
        notification::NotificationKind,
        user::{self, Role},
    },
    repositories::{
        ArticleRepository, CategoryRepository, FollowRepository, UserRepository,
    },
};
use sea_orm::Set;
use validator::Validate;

/// Input for creating an article.
#[derive(Debug, Validate)]
pub struct CreateArticleInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
    #[validate(length(max = 500, message = "Excerpt too long"))]
    pub excerpt: Option<String>,
    pub category_id: Option<String>,
    pub tag_ids: Vec<String>,
    #[validate(url(message = "Invalid image URL"))]
    pub featured_image_url: Option<String>,
    /// Submit for review immediately instead of saving a draft.
    pub submit: bool,
}

/// Input for updating an article. `None` leaves a field untouched.
#[derive(Debug, Default, Validate)]
pub struct UpdateArticleInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Body cannot be empty"))]
    pub body: Option<String>,
    #[validate(length(max = 500, message = "Excerpt too long"))]
    pub excerpt: Option<String>,
    pub category_id: Option<Option<String>>,
    pub tag_ids: Option<Vec<String>>,
    #[validate(url(message = "Invalid image URL"))]
    pub featured_image_url: Option<String>,
}

/// Article service for business logic.
#[derive(Clone)]
pub struct ArticleService {
    article_repo: ArticleRepository,
    user_repo: UserRepository,
    category_repo: CategoryRepository,
    follow_repo: FollowRepository,
    notification_service: NotificationService,
    badge_service: BadgeService,
    id_gen: IdGenerator,
}

impl ArticleService {
    /// Create a new article service.
    #[must_use]
    pub fn new(
        article_repo: ArticleRepository,
        user_repo: UserRepository,
        category_repo: CategoryRepository,
        follow_repo: FollowRepository,
        notification_service: NotificationService,
        badge_service: BadgeService,
    ) -> Self {
        Self {
            article_repo,
            user_repo,
            category_repo,
            follow_repo,
            notification_service,
            badge_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an article, as a draft or submitted straight into review.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateArticleInput,
    ) -> AppResult<article::Model> {
        input.validate()?;
        if author.role == Role::User {
            return Err(AppError::Forbidden(
                "Only authors can create articles".to_string(),
            ));
        }

        if let Some(category_id) = &input.category_id {
            self.category_repo.get_by_id(category_id).await?;
        }

        let slug = {
            let base = slugify(&input.title);
            if self.article_repo.slug_exists(&base).await? {
                slugify_unique(&input.title)
            } else {
                base
            }
        };

        let status = if input.submit {
            ArticleStatus::Pending
        } else {
            ArticleStatus::Draft
        };

        let model = article::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            category_id: Set(input.category_id),
            title: Set(input.title),
            slug: Set(slug),
            excerpt: Set(input.excerpt),
            body: Set(input.body),
            featured_image_url: Set(input.featured_image_url),
            status: Set(status),
            rejection_reason: Set(None),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            is_featured: Set(false),
            view_count: Set(0),
            like_count: Set(0),
            comment_count: Set(0),
            published_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.article_repo.create(model).await?;

        if !input.tag_ids.is_empty() {
            self.article_repo
                .set_tags(&created.id, &input.tag_ids)
                .await?;
        }

        Ok(created)
    }

    /// Update a draft or rejected article. Editing a rejected article
    /// moves it back to draft and clears the rejection verdict.
    pub async fn update(
        &self,
        actor: &user::Model,
        article_id: &str,
        input: UpdateArticleInput,
    ) -> AppResult<article::Model> {
        input.validate()?;
        let current = self.article_repo.get_by_id(article_id).await?;

        if current.author_id != actor.id {
            return Err(AppError::Forbidden("Not your article".to_string()));
        }
        if !matches!(
            current.status,
            ArticleStatus::Draft | ArticleStatus::Rejected
        ) {
            return Err(AppError::Conflict(
                "Only draft or rejected articles can be edited".to_string(),
            ));
        }

        if let Some(Some(category_id)) = &input.category_id {
            self.category_repo.get_by_id(category_id).await?;
        }

        let was_rejected = current.status == ArticleStatus::Rejected;
        let id = current.id.clone();
        let mut model: article::ActiveModel = current.into();

        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(body) = input.body {
            model.body = Set(body);
        }
        if let Some(excerpt) = input.excerpt {
            model.excerpt = Set(Some(excerpt));
        }
        if let Some(category_id) = input.category_id {
            model.category_id = Set(category_id);
        }
        if let Some(featured_image_url) = input.featured_image_url {
            model.featured_image_url = Set(Some(featured_image_url));
        }
        if was_rejected {
            model.status = Set(ArticleStatus::Draft);
            model.rejection_reason = Set(None);
            model.reviewed_by = Set(None);
            model.reviewed_at = Set(None);
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.article_repo.update(model).await?;

        if let Some(tag_ids) = input.tag_ids {
            self.article_repo.set_tags(&id, &tag_ids).await?;
        }

        Ok(updated)
    }

    /// Submit a draft for review (`draft -> pending`).
    pub async fn submit(&self, author: &user::Model, article_id: &str) -> AppResult<article::Model> {
        let rows = self
            .article_repo
            .submit_if_draft(article_id, &author.id)
            .await?;
        if rows == 0 {
            let current = self.article_repo.get_by_id(article_id).await?;
            if current.author_id != author.id {
                return Err(AppError::Forbidden("Not your article".to_string()));
            }
            return Err(AppError::Conflict(format!(
                "Cannot submit an article in status '{}'",
                status_name(current.status)
            )));
        }
        self.article_repo.get_by_id(article_id).await
    }

    /// Approve a pending article (`pending -> published`).
    ///
    /// Bumps the author's published-article counter and the category
    /// counter, notifies the author and their followers, and awards
    /// publication badges. Everything after the transition itself is
    /// best-effort.
    pub async fn approve(&self, admin: &user::Model, article_id: &str) -> AppResult<article::Model> {
        super::user::ensure_admin(admin)?;

        let rows = self
            .article_repo
            .publish_if_pending(article_id, &admin.id)
            .await?;
        if rows == 0 {
            self.article_repo.get_by_id(article_id).await?;
            return Err(AppError::Conflict("Article already reviewed".to_string()));
        }

        let published = self.article_repo.get_by_id(article_id).await?;

        self.user_repo
            .increment_article_count(&published.author_id)
            .await?;
        if let Some(category_id) = &published.category_id {
            self.category_repo.adjust_article_count(category_id, 1).await?;
        }

        self.notify_published(admin, &published).await;

        if let Err(e) = self
            .badge_service
            .award_for_publications(&published.author_id)
            .await
        {
            tracing::warn!(error = %e, article_id, "Failed to award publication badges");
        }

        Ok(published)
    }

    /// Reject a pending article (`pending -> rejected`). The reason is
    /// mandatory and travels verbatim into the author's notification.
    pub async fn reject(
        &self,
        admin: &user::Model,
        article_id: &str,
        reason: &str,
    ) -> AppResult<article::Model> {
        super::user::ensure_admin(admin)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "Rejection reason is required".to_string(),
            ));
        }
        if reason.len() > 2000 {
            return Err(AppError::Validation("Rejection reason too long".to_string()));
        }

        let rows = self
            .article_repo
            .reject_if_pending(article_id, &admin.id, reason)
            .await?;
        if rows == 0 {
            self.article_repo.get_by_id(article_id).await?;
            return Err(AppError::Conflict("Article already reviewed".to_string()));
        }

        let rejected = self.article_repo.get_by_id(article_id).await?;

        let notify = self
            .notification_service
            .notify(NotifyInput {
                recipient_id: rejected.author_id.clone(),
                actor_id: Some(admin.id.clone()),
                kind: NotificationKind::ArticleRejected,
                title: "Article rejected".to_string(),
                message: reason.to_string(),
                link: Some(format!("/articles/{}", rejected.id)),
            })
            .await;
        if let Err(e) = notify {
            tracing::warn!(error = %e, article_id, "Failed to emit rejection notification");
        }

        Ok(rejected)
    }

    /// Archive a published article (`published -> archived`).
    pub async fn archive(&self, actor: &user::Model, article_id: &str) -> AppResult<article::Model> {
        self.ensure_owner_or_admin(actor, article_id).await?;

        let rows = self
            .article_repo
            .set_status_if(article_id, ArticleStatus::Published, ArticleStatus::Archived)
            .await?;
        if rows == 0 {
            return Err(AppError::Conflict(
                "Only published articles can be archived".to_string(),
            ));
        }

        let archived = self.article_repo.get_by_id(article_id).await?;

        self.user_repo
            .decrement_article_count(&archived.author_id)
            .await?;
        if let Some(category_id) = &archived.category_id {
            self.category_repo.adjust_article_count(category_id, -1).await?;
        }

        Ok(archived)
    }

    /// Restore an archived article (`archived -> published`) without
    /// touching `published_at`.
    pub async fn unarchive(
        &self,
        actor: &user::Model,
        article_id: &str,
    ) -> AppResult<article::Model> {
        self.ensure_owner_or_admin(actor, article_id).await?;

        let rows = self
            .article_repo
            .set_status_if(article_id, ArticleStatus::Archived, ArticleStatus::Published)
            .await?;
        if rows == 0 {
            return Err(AppError::Conflict(
                "Only archived articles can be restored".to_string(),
            ));
        }

        let restored = self.article_repo.get_by_id(article_id).await?;

        self.user_repo
            .increment_article_count(&restored.author_id)
            .await?;
        if let Some(category_id) = &restored.category_id {
            self.category_repo.adjust_article_count(category_id, 1).await?;
        }

        Ok(restored)
    }

    /// Delete an article. Owner or admin; everything hanging off it goes
    /// via FK cascade.
    pub async fn delete(&self, actor: &user::Model, article_id: &str) -> AppResult<()> {
        let current = self.ensure_owner_or_admin(actor, article_id).await?;

        if current.status == ArticleStatus::Published {
            self.user_repo
                .decrement_article_count(&current.author_id)
                .await?;
            if let Some(category_id) = &current.category_id {
                self.category_repo.adjust_article_count(category_id, -1).await?;
            }
        }

        self.article_repo.delete(article_id).await
    }

    /// Feature or unfeature a published article.
    pub async fn set_featured(
        &self,
        admin: &user::Model,
        article_id: &str,
        featured: bool,
    ) -> AppResult<article::Model> {
        super::user::ensure_admin(admin)?;

        let rows = self
            .article_repo
            .set_featured_if_published(article_id, featured)
            .await?;
        if rows == 0 {
            self.article_repo.get_by_id(article_id).await?;
            return Err(AppError::Conflict(
                "Only published articles can be featured".to_string(),
            ));
        }

        self.article_repo.get_by_id(article_id).await
    }

    /// Fetch an article by ID, enforcing visibility, and count the view.
    ///
    /// Published articles are public. Anything else is visible only to
    /// the owner and admins; everyone else gets Forbidden. The view
    /// counter moves only for published articles viewed by someone other
    /// than the author, and the visibility check runs first.
    pub async fn get(
        &self,
        viewer: Option<&user::Model>,
        article_id: &str,
    ) -> AppResult<article::Model> {
        let article = self.article_repo.get_by_id(article_id).await?;
        self.finish_get(viewer, article).await
    }

    /// Fetch an article by slug with the same rules as [`Self::get`].
    pub async fn get_by_slug(
        &self,
        viewer: Option<&user::Model>,
        slug: &str,
    ) -> AppResult<article::Model> {
        let article = self
            .article_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound(slug.to_string()))?;
        self.finish_get(viewer, article).await
    }

    async fn finish_get(
        &self,
        viewer: Option<&user::Model>,
        article: article::Model,
    ) -> AppResult<article::Model> {
        if article.status != ArticleStatus::Published {
            let allowed = viewer.is_some_and(|v| {
                v.id == article.author_id || v.role == Role::Admin
            });
            if !allowed {
                return Err(AppError::Forbidden(
                    "This article is not published".to_string(),
                ));
            }
            return Ok(article);
        }

        let is_author = viewer.is_some_and(|v| v.id == article.author_id);
        if !is_author {
            self.article_repo.increment_view_count(&article.id).await?;
        }

        Ok(article)
    }

    /// Published feed, optionally filtered by category.
    pub async fn list_published(
        &self,
        category_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        self.article_repo
            .list_published(category_id, limit, offset)
            .await
    }

    /// Published feed narrowed to one tag.
    pub async fn list_published_tagged(
        &self,
        tag_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        self.article_repo
            .list_published_tagged(tag_id, limit, offset)
            .await
    }

    /// Featured published articles.
    pub async fn list_featured(&self, limit: u64) -> AppResult<Vec<article::Model>> {
        self.article_repo.list_featured(limit).await
    }

    /// An author's published articles, for public profiles.
    pub async fn list_published_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        self.article_repo
            .list_published_by_author(author_id, limit, offset)
            .await
    }

    /// An author's own articles, every status included.
    pub async fn list_own(
        &self,
        author: &user::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        self.article_repo.list_by_author(&author.id, limit, offset).await
    }

    /// The admin review queue, oldest submission first.
    pub async fn list_pending(
        &self,
        admin: &user::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<article::Model>> {
        super::user::ensure_admin(admin)?;
        self.article_repo.list_pending(limit, offset).await
    }

    async fn ensure_owner_or_admin(
        &self,
        actor: &user::Model,
        article_id: &str,
    ) -> AppResult<article::Model> {
        let current = self.article_repo.get_by_id(article_id).await?;
        if current.author_id != actor.id && actor.role != Role::Admin {
            return Err(AppError::Forbidden("Not your article".to_string()));
        }
        Ok(current)
    }

    async fn notify_published(&self, admin: &user::Model, published: &article::Model) {
        let author_note = self
            .notification_service
            .notify(NotifyInput {
                recipient_id: published.author_id.clone(),
                actor_id: Some(admin.id.clone()),
                kind: NotificationKind::ArticlePublished,
                title: "Article published".to_string(),
                message: format!("\"{}\" has been approved and published", published.title),
                link: Some(format!("/articles/{}", published.slug)),
            })
            .await;
        if let Err(e) = author_note {
            tracing::warn!(error = %e, article_id = %published.id, "Failed to emit approval notification");
        }

        let followers = match self.follow_repo.follower_ids(&published.author_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, author_id = %published.author_id, "Failed to load followers for fan-out");
                return;
            }
        };

        for follower_id in followers {
            let result = self
                .notification_service
                .notify(NotifyInput {
                    recipient_id: follower_id.clone(),
                    actor_id: Some(published.author_id.clone()),
                    kind: NotificationKind::ArticlePublished,
                    title: "New article".to_string(),
                    message: format!("New article: \"{}\"", published.title),
                    link: Some(format!("/articles/{}", published.slug)),
                })
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, follower_id, "Failed to emit publish notification");
            }
        }
    }
}

const fn status_name(status: ArticleStatus) -> &'static str {
    match status {
        ArticleStatus::Draft => "draft",
        ArticleStatus::Pending => "pending",
        ArticleStatus::Published => "published",
        ArticleStatus::Rejected => "rejected",
        ArticleStatus::Archived => "archived",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
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

    fn test_article(id: &str, author_id: &str, status: ArticleStatus) -> article::Model {
        article::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            category_id: None,
            title: "Title".to_string(),
            slug: format!("title-{id}"),
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

    fn service(db: sea_orm::DatabaseConnection) -> ArticleService {
        let db = Arc::new(db);
        let article_repo = ArticleRepository::new(db.clone());
        let engagement_repo = curio_db::repositories::EngagementRepository::new(db.clone());
        let badge_repo = curio_db::repositories::BadgeRepository::new(db.clone());
        ArticleService::new(
            article_repo.clone(),
            UserRepository::new(db.clone()),
            CategoryRepository::new(db.clone()),
            FollowRepository::new(db.clone()),
            NotificationService::new(curio_db::repositories::NotificationRepository::new(
                db.clone(),
            )),
            BadgeService::new(badge_repo, article_repo, engagement_repo),
        )
    }

    #[tokio::test]
    async fn test_create_requires_author_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let reader = test_user("reader", Role::User);

        let result = svc
            .create(
                &reader,
                CreateArticleInput {
                    title: "Hello".to_string(),
                    body: "World".to_string(),
                    excerpt: None,
                    category_id: None,
                    tag_ids: vec![],
                    featured_image_url: None,
                    submit: false,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_approve_requires_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let author = test_user("author1", Role::Author);

        let result = svc.approve(&author, "a1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_approve_already_reviewed_is_conflict() {
        let existing = test_article("a1", "author1", ArticleStatus::Published);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([[existing]])
            .into_connection();
        let svc = service(db);
        let admin = test_user("admin1", Role::Admin);

        let result = svc.approve(&admin, "a1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_approve_missing_article_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<article::Model>::new()])
            .into_connection();
        let svc = service(db);
        let admin = test_user("admin1", Role::Admin);

        let result = svc.approve(&admin, "missing").await;

        assert!(matches!(result, Err(AppError::ArticleNotFound(_))));
    }

    #[tokio::test]
    async fn test_approve_persists_article_published_kind_for_author() {
        let published = test_article("a1", "author1", ArticleStatus::Published);
        let note = curio_db::entities::notification::Model {
            id: "n1".to_string(),
            recipient_id: "author1".to_string(),
            actor_id: Some("admin1".to_string()),
            kind: NotificationKind::ArticlePublished,
            title: "Article published".to_string(),
            message: String::new(),
            link: None,
            is_read: false,
            created_at: Utc::now().into(),
        };
        let mut count_row = std::collections::BTreeMap::new();
        count_row.insert("num_items", sea_orm::Value::BigInt(Some(1)));

        // Exec queue: publish_if_pending, increment_article_count.
        // Query queue: re-read, notification insert, follower fan-out,
        // published count, badge thresholds.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .append_query_results([[published]])
                .append_query_results([[note]])
                .append_query_results([Vec::<curio_db::entities::follow::Model>::new()])
                .append_query_results([[count_row]])
                .append_query_results([Vec::<curio_db::entities::badge::Model>::new()])
                .into_connection(),
        );

        let article_repo = ArticleRepository::new(db.clone());
        let svc = ArticleService::new(
            article_repo.clone(),
            UserRepository::new(db.clone()),
            CategoryRepository::new(db.clone()),
            FollowRepository::new(db.clone()),
            NotificationService::new(curio_db::repositories::NotificationRepository::new(
                db.clone(),
            )),
            BadgeService::new(
                curio_db::repositories::BadgeRepository::new(db.clone()),
                article_repo,
                curio_db::repositories::EngagementRepository::new(db.clone()),
            ),
        );
        let admin = test_user("admin1", Role::Admin);

        svc.approve(&admin, "a1").await.unwrap();

        drop(svc);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let statements = format!("{log:?}");
        assert!(statements.contains("article_published"));
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let admin = test_user("admin1", Role::Admin);

        let result = svc.reject(&admin, "a1", "   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_hidden_article_is_forbidden_for_strangers() {
        let draft = test_article("a1", "author1", ArticleStatus::Draft);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[draft]])
            .into_connection();
        let svc = service(db);
        let stranger = test_user("stranger", Role::User);

        let result = svc.get(Some(&stranger), "a1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_hidden_article_visible_to_owner_without_view_bump() {
        let draft = test_article("a1", "author1", ArticleStatus::Draft);
        // Only the fetch query is queued: a view-count UPDATE would panic
        // the mock.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[draft]])
            .into_connection();
        let svc = service(db);
        let owner = test_user("author1", Role::Author);

        let result = svc.get(Some(&owner), "a1").await.unwrap();

        assert_eq!(result.status, ArticleStatus::Draft);
    }

    #[tokio::test]
    async fn test_get_published_by_author_skips_view_count() {
        let published = test_article("a1", "author1", ArticleStatus::Published);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[published]])
            .into_connection();
        let svc = service(db);
        let owner = test_user("author1", Role::Author);

        let result = svc.get(Some(&owner), "a1").await.unwrap();

        assert_eq!(result.view_count, 0);
    }

    #[tokio::test]
    async fn test_update_published_article_is_conflict() {
        let published = test_article("a1", "author1", ArticleStatus::Published);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[published]])
            .into_connection();
        let svc = service(db);
        let owner = test_user("author1", Role::Author);

        let result = svc
            .update(&owner, "a1", UpdateArticleInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_submit_wrong_status_is_conflict() {
        let published = test_article("a1", "author1", ArticleStatus::Published);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([[published]])
            .into_connection();
        let svc = service(db);
        let owner = test_user("author1", Role::Author);

        let result = svc.submit(&owner, "a1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_submit_someone_elses_draft_is_forbidden() {
        let draft = test_article("a1", "author1", ArticleStatus::Draft);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([[draft]])
            .into_connection();
        let svc = service(db);
        let other = test_user("other_author", Role::Author);

        let result = svc.submit(&other, "a1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
