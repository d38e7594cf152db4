//! Comment service.

use crate::services::{NotificationService, NotifyInput};
use curio_common::{AppError, AppResult, IdGenerator};
use curio_db::{
    entities::{
        article::ArticleStatus,
        comment,
        notification::NotificationKind,
        user::{self, Role},
    },
    repositories::{ArticleRepository, CommentRepository},
};
use sea_orm::Set;
use serde::Serialize;
use validator::Validate;

/// Input for posting a comment.
#[derive(Debug, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub content: String,
    /// Reply target; must be a comment on the same article.
    pub parent_id: Option<String>,
}

/// A top-level comment with its replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub replies: Vec<comment::Model>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    article_repo: ArticleRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        article_repo: ArticleRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            article_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment or a reply on an article the commenter can see.
    pub async fn create(
        &self,
        commenter: &user::Model,
        article_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let article = self.article_repo.get_by_id(article_id).await?;
        if article.status != ArticleStatus::Published
            && article.author_id != commenter.id
            && commenter.role != Role::Admin
        {
            return Err(AppError::Forbidden(
                "This article is not published".to_string(),
            ));
        }

        let parent = match &input.parent_id {
            Some(parent_id) => {
                let parent = self.comment_repo.get_by_id(parent_id).await?;
                if parent.article_id != article_id {
                    return Err(AppError::Validation(
                        "Parent comment belongs to a different article".to_string(),
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            article_id: Set(article_id.to_string()),
            author_id: Set(commenter.id.clone()),
            parent_id: Set(input.parent_id),
            content: Set(input.content.trim().to_string()),
            is_approved: Set(true),
            is_reported: Set(false),
            like_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.comment_repo.create(model).await?;
        self.article_repo.adjust_comment_count(article_id, 1).await?;

        // Reply -> parent author; top-level -> article author. Self is
        // skipped inside notify.
        let (recipient, kind, title) = match &parent {
            Some(parent) => (
                parent.author_id.clone(),
                NotificationKind::Reply,
                "New reply",
            ),
            None => (
                article.author_id.clone(),
                NotificationKind::Comment,
                "New comment",
            ),
        };
        let notify = self
            .notification_service
            .notify(NotifyInput {
                recipient_id: recipient,
                actor_id: Some(commenter.id.clone()),
                kind,
                title: title.to_string(),
                message: format!("{} commented on \"{}\"", commenter.username, article.title),
                link: Some(format!("/articles/{}#comment-{}", article.slug, created.id)),
            })
            .await;
        if let Err(e) = notify {
            tracing::warn!(error = %e, comment_id = %created.id, "Failed to emit comment notification");
        }

        Ok(created)
    }

    /// Edit one's own comment.
    pub async fn update(
        &self,
        actor: &user::Model,
        comment_id: &str,
        content: &str,
    ) -> AppResult<comment::Model> {
        let content = content.trim();
        if content.is_empty() || content.len() > 5000 {
            return Err(AppError::Validation(
                "Comment must be 1-5000 characters".to_string(),
            ));
        }

        let current = self.comment_repo.get_by_id(comment_id).await?;
        if current.author_id != actor.id {
            return Err(AppError::Forbidden("Not your comment".to_string()));
        }

        let mut model: comment::ActiveModel = current.into();
        model.content = Set(content.to_string());
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        self.comment_repo.update(model).await
    }

    /// Delete a comment: the comment author, the article author or an
    /// admin. Replies cascade; the article counter drops by one.
    pub async fn delete(&self, actor: &user::Model, comment_id: &str) -> AppResult<()> {
        let current = self.comment_repo.get_by_id(comment_id).await?;
        let article = self.article_repo.get_by_id(&current.article_id).await?;

        let allowed = current.author_id == actor.id
            || article.author_id == actor.id
            || actor.role == Role::Admin;
        if !allowed {
            return Err(AppError::Forbidden("Not your comment".to_string()));
        }

        self.comment_repo.delete(comment_id).await?;
        self.article_repo
            .adjust_comment_count(&current.article_id, -1)
            .await?;
        Ok(())
    }

    /// Restore a hidden comment (admin).
    pub async fn approve(&self, admin: &user::Model, comment_id: &str) -> AppResult<()> {
        super::user::ensure_admin(admin)?;
        self.comment_repo.get_by_id(comment_id).await?;
        self.comment_repo.set_approved(comment_id, true).await
    }

    /// Approved comments threaded: top-level in posting order, replies
    /// nested under their parents. Article visibility enforced first.
    pub async fn list_for_article(
        &self,
        viewer: Option<&user::Model>,
        article_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<CommentThread>> {
        let article = self.article_repo.get_by_id(article_id).await?;
        if article.status != ArticleStatus::Published {
            let allowed = viewer.is_some_and(|v| {
                v.id == article.author_id || v.role == Role::Admin
            });
            if !allowed {
                return Err(AppError::Forbidden(
                    "This article is not published".to_string(),
                ));
            }
        }

        let flat = self
            .comment_repo
            .list_by_article(article_id, limit, offset)
            .await?;
        Ok(thread_comments(flat))
    }
}

/// Nest replies under their top-level parents, preserving order. Replies
/// whose parent fell outside the page are dropped rather than orphaned.
fn thread_comments(flat: Vec<comment::Model>) -> Vec<CommentThread> {
    let mut threads: Vec<CommentThread> = Vec::new();

    for comment in flat {
        match &comment.parent_id {
            None => threads.push(CommentThread {
                comment,
                replies: Vec::new(),
            }),
            Some(parent_id) => {
                if let Some(parent) = threads.iter_mut().find(|t| &t.comment.id == parent_id) {
                    parent.replies.push(comment);
                }
            }
        }
    }

    threads
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_comment(id: &str, parent_id: Option<&str>) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            article_id: "a1".to_string(),
            author_id: "u1".to_string(),
            parent_id: parent_id.map(String::from),
            content: "text".to_string(),
            is_approved: true,
            is_reported: false,
            like_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_thread_comments_nests_replies() {
        let flat = vec![
            test_comment("c1", None),
            test_comment("c2", Some("c1")),
            test_comment("c3", None),
            test_comment("c4", Some("c1")),
        ];

        let threads = thread_comments(flat);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].replies.len(), 2);
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn test_thread_comments_drops_orphan_replies() {
        let flat = vec![test_comment("c2", Some("missing"))];

        let threads = thread_comments(flat);

        assert!(threads.is_empty());
    }

    #[tokio::test]
    async fn test_reply_to_comment_on_other_article_is_validation_error() {
        use crate::services::NotificationService;
        use curio_db::entities::{article::ArticleStatus, user::Role};
        use curio_db::repositories::{
            ArticleRepository, CommentRepository, NotificationRepository,
        };
        use sea_orm::{DatabaseBackend, MockDatabase};
        use std::sync::Arc;

        let article = curio_db::entities::article::Model {
            id: "a1".to_string(),
            author_id: "author1".to_string(),
            category_id: None,
            title: "T".to_string(),
            slug: "t".to_string(),
            excerpt: None,
            body: "B".to_string(),
            featured_image_url: None,
            status: ArticleStatus::Published,
            rejection_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            is_featured: false,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            published_at: Some(Utc::now().into()),
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let mut parent = test_comment("c9", None);
        parent.article_id = "other-article".to_string();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[article]])
                .append_query_results([[parent]])
                .into_connection(),
        );
        let svc = CommentService::new(
            CommentRepository::new(db.clone()),
            ArticleRepository::new(db.clone()),
            NotificationService::new(NotificationRepository::new(db)),
        );
        let commenter = user::Model {
            id: "u2".to_string(),
            email: "u2@example.com".to_string(),
            username: "u2".to_string(),
            username_lower: "u2".to_string(),
            password_hash: "hash".to_string(),
            display_name: None,
            bio: None,
            avatar_url: None,
            role: Role::User,
            is_banned: false,
            is_active: true,
            article_count: 0,
            follower_count: 0,
            following_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let result = svc
            .create(
                &commenter,
                "a1",
                CreateCommentInput {
                    content: "hi".to_string(),
                    parent_id: Some("c9".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
