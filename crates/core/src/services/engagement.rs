//! Engagement service: likes, bookmarks, reading lists and follows.

use crate::services::{BadgeService, NotificationService, NotifyInput};
use curio_common::{AppError, AppResult, IdGenerator};
use curio_db::{
    entities::{
        article::{self, ArticleStatus},
        article_like, bookmark, comment_like, follow,
        notification::NotificationKind,
        reading_list_entry,
        user,
    },
    repositories::{
        ArticleRepository, CommentRepository, EngagementRepository, FollowRepository,
        UserRepository,
    },
};
use sea_orm::Set;

/// Engagement service for business logic.
#[derive(Clone)]
pub struct EngagementService {
    engagement_repo: EngagementRepository,
    article_repo: ArticleRepository,
    comment_repo: CommentRepository,
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    badge_service: BadgeService,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engagement_repo: EngagementRepository,
        article_repo: ArticleRepository,
        comment_repo: CommentRepository,
        follow_repo: FollowRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
        badge_service: BadgeService,
    ) -> Self {
        Self {
            engagement_repo,
            article_repo,
            comment_repo,
            follow_repo,
            user_repo,
            notification_service,
            badge_service,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Article likes ==========

    /// Like a published article.
    pub async fn like_article(&self, user: &user::Model, article_id: &str) -> AppResult<()> {
        let article = self.article_repo.get_by_id(article_id).await?;
        if article.status != ArticleStatus::Published {
            return Err(AppError::Conflict(
                "Only published articles can be liked".to_string(),
            ));
        }

        if self
            .engagement_repo
            .article_like_exists(article_id, &user.id)
            .await?
        {
            return Err(AppError::Conflict("Already liked".to_string()));
        }

        let model = article_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            article_id: Set(article_id.to_string()),
            user_id: Set(user.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.engagement_repo
            .create_article_like(model)
            .await
            .map_err(|e| map_duplicate(e, "Already liked"))?;

        self.article_repo.adjust_like_count(article_id, 1).await?;

        self.emit_like(user, &article).await;

        if let Err(e) = self.badge_service.award_for_likes(&article.author_id).await {
            tracing::warn!(error = %e, article_id, "Failed to award like badges");
        }

        Ok(())
    }

    /// Remove a like.
    pub async fn unlike_article(&self, user: &user::Model, article_id: &str) -> AppResult<()> {
        let rows = self
            .engagement_repo
            .delete_article_like(article_id, &user.id)
            .await?;
        if rows == 0 {
            return Err(AppError::NotFound("Like not found".to_string()));
        }
        self.article_repo.adjust_like_count(article_id, -1).await?;
        Ok(())
    }

    // ========== Comment likes ==========

    /// Like a comment.
    pub async fn like_comment(&self, user: &user::Model, comment_id: &str) -> AppResult<()> {
        self.comment_repo.get_by_id(comment_id).await?;

        if self
            .engagement_repo
            .comment_like_exists(comment_id, &user.id)
            .await?
        {
            return Err(AppError::Conflict("Already liked".to_string()));
        }

        let model = comment_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            comment_id: Set(comment_id.to_string()),
            user_id: Set(user.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.engagement_repo
            .create_comment_like(model)
            .await
            .map_err(|e| map_duplicate(e, "Already liked"))?;

        self.comment_repo.adjust_like_count(comment_id, 1).await?;
        Ok(())
    }

    /// Remove a comment like.
    pub async fn unlike_comment(&self, user: &user::Model, comment_id: &str) -> AppResult<()> {
        let rows = self
            .engagement_repo
            .delete_comment_like(comment_id, &user.id)
            .await?;
        if rows == 0 {
            return Err(AppError::NotFound("Like not found".to_string()));
        }
        self.comment_repo.adjust_like_count(comment_id, -1).await?;
        Ok(())
    }

    // ========== Bookmarks ==========

    /// Bookmark an article.
    pub async fn bookmark(&self, user: &user::Model, article_id: &str) -> AppResult<()> {
        self.article_repo.get_by_id(article_id).await?;

        if self
            .engagement_repo
            .bookmark_exists(article_id, &user.id)
            .await?
        {
            return Err(AppError::Conflict("Already bookmarked".to_string()));
        }

        let model = bookmark::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            article_id: Set(article_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.engagement_repo
            .create_bookmark(model)
            .await
            .map_err(|e| map_duplicate(e, "Already bookmarked"))?;
        Ok(())
    }

    /// Remove a bookmark.
    pub async fn unbookmark(&self, user: &user::Model, article_id: &str) -> AppResult<()> {
        let rows = self
            .engagement_repo
            .delete_bookmark(article_id, &user.id)
            .await?;
        if rows == 0 {
            return Err(AppError::NotFound("Bookmark not found".to_string()));
        }
        Ok(())
    }

    /// A user's bookmarks, newest first.
    pub async fn list_bookmarks(
        &self,
        user: &user::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<bookmark::Model>> {
        self.engagement_repo
            .list_bookmarks(&user.id, limit, offset)
            .await
    }

    // ========== Reading list ==========

    /// Append an article to the end of the reading list.
    pub async fn add_to_reading_list(&self, user: &user::Model, article_id: &str) -> AppResult<()> {
        self.article_repo.get_by_id(article_id).await?;

        if self
            .engagement_repo
            .reading_list_entry_exists(article_id, &user.id)
            .await?
        {
            return Err(AppError::Conflict("Already on the reading list".to_string()));
        }

        let position = self
            .engagement_repo
            .max_reading_list_position(&user.id)
            .await?
            .map_or(0, |p| p + 1);

        let model = reading_list_entry::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            article_id: Set(article_id.to_string()),
            position: Set(position),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.engagement_repo
            .create_reading_list_entry(model)
            .await
            .map_err(|e| map_duplicate(e, "Already on the reading list"))?;
        Ok(())
    }

    /// Remove an article from the reading list.
    pub async fn remove_from_reading_list(
        &self,
        user: &user::Model,
        article_id: &str,
    ) -> AppResult<()> {
        let rows = self
            .engagement_repo
            .delete_reading_list_entry(article_id, &user.id)
            .await?;
        if rows == 0 {
            return Err(AppError::NotFound("Reading list entry not found".to_string()));
        }
        Ok(())
    }

    /// The reading list in position order.
    pub async fn list_reading_list(
        &self,
        user: &user::Model,
    ) -> AppResult<Vec<reading_list_entry::Model>> {
        self.engagement_repo.list_reading_list(&user.id).await
    }

    // ========== Follows ==========

    /// Follow another user.
    pub async fn follow(&self, follower: &user::Model, followee_id: &str) -> AppResult<()> {
        if follower.id == followee_id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        let followee = self.user_repo.get_by_id(followee_id).await?;

        if self.follow_repo.exists(&follower.id, followee_id).await? {
            return Err(AppError::Conflict("Already following".to_string()));
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower.id.clone()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.follow_repo
            .create(model)
            .await
            .map_err(|e| map_duplicate(e, "Already following"))?;

        self.user_repo
            .adjust_follow_counts(&follower.id, followee_id, 1)
            .await?;

        let notify = self
            .notification_service
            .notify(NotifyInput {
                recipient_id: followee.id.clone(),
                actor_id: Some(follower.id.clone()),
                kind: NotificationKind::Follow,
                title: "New follower".to_string(),
                message: format!("{} is now following you", follower.username),
                link: Some(format!("/users/{}", follower.username)),
            })
            .await;
        if let Err(e) = notify {
            tracing::warn!(error = %e, followee_id, "Failed to emit follow notification");
        }

        Ok(())
    }

    /// Unfollow a user.
    pub async fn unfollow(&self, follower: &user::Model, followee_id: &str) -> AppResult<()> {
        let rows = self.follow_repo.delete(&follower.id, followee_id).await?;
        if rows == 0 {
            return Err(AppError::NotFound("Not following".to_string()));
        }
        self.user_repo
            .adjust_follow_counts(&follower.id, followee_id, -1)
            .await?;
        Ok(())
    }

    /// Follower rows for a user profile.
    pub async fn list_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        self.follow_repo.list_followers(user_id, limit, offset).await
    }

    /// Following rows for a user profile.
    pub async fn list_following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        self.follow_repo.list_following(user_id, limit, offset).await
    }

    async fn emit_like(&self, liker: &user::Model, article: &article::Model) {
        let result = self
            .notification_service
            .notify(NotifyInput {
                recipient_id: article.author_id.clone(),
                actor_id: Some(liker.id.clone()),
                kind: NotificationKind::Like,
                title: "New like".to_string(),
                message: format!("{} liked \"{}\"", liker.username, article.title),
                link: Some(format!("/articles/{}", article.slug)),
            })
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, article_id = %article.id, "Failed to emit like notification");
        }
    }
}

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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use curio_db::{
        entities::user::Role,
        repositories::{BadgeRepository, NotificationRepository},
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            username: id.to_string(),
            username_lower: id.to_lowercase(),
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
        }
    }

    fn test_article(id: &str, status: ArticleStatus) -> article::Model {
        article::Model {
            id: id.to_string(),
            author_id: "author1".to_string(),
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

    fn service(db: sea_orm::DatabaseConnection) -> EngagementService {
        let db = Arc::new(db);
        let article_repo = ArticleRepository::new(db.clone());
        let engagement_repo = EngagementRepository::new(db.clone());
        EngagementService::new(
            engagement_repo.clone(),
            article_repo.clone(),
            CommentRepository::new(db.clone()),
            FollowRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            NotificationService::new(NotificationRepository::new(db.clone())),
            BadgeService::new(BadgeRepository::new(db.clone()), article_repo, engagement_repo),
        )
    }

    #[tokio::test]
    async fn test_like_draft_article_is_conflict() {
        let draft = test_article("a1", ArticleStatus::Draft);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[draft]])
            .into_connection();
        let svc = service(db);
        let user = test_user("user1");

        let result = svc.like_article(&user, "a1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_self_follow_is_validation_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let user = test_user("user1");

        let result = svc.follow(&user, "user1").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
