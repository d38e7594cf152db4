//! Badge service.
//!
//! Awards are milestone-driven and idempotent: the unique (user, badge)
//! pair makes a repeat award a no-op, so callers can re-run the check
//! after every qualifying event.

use curio_common::AppResult;
use curio_db::{
    entities::{badge, badge::BadgeKind, user_badge},
    repositories::{ArticleRepository, BadgeRepository, EngagementRepository},
};

/// Badge service for business logic.
#[derive(Clone)]
pub struct BadgeService {
    badge_repo: BadgeRepository,
    article_repo: ArticleRepository,
    engagement_repo: EngagementRepository,
}

impl BadgeService {
    /// Create a new badge service.
    #[must_use]
    pub const fn new(
        badge_repo: BadgeRepository,
        article_repo: ArticleRepository,
        engagement_repo: EngagementRepository,
    ) -> Self {
        Self {
            badge_repo,
            article_repo,
            engagement_repo,
        }
    }

    /// All badge definitions.
    pub async fn list(&self) -> AppResult<Vec<badge::Model>> {
        self.badge_repo.list().await
    }

    /// Badges a user has earned, joined with their definitions.
    pub async fn list_for_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<(user_badge::Model, badge::Model)>> {
        let earned = self.badge_repo.list_for_user(user_id).await?;
        let ids: Vec<String> = earned.iter().map(|e| e.badge_id.clone()).collect();
        let definitions = self.badge_repo.find_by_ids(&ids).await?;

        let mut joined = Vec::with_capacity(earned.len());
        for entry in earned {
            if let Some(def) = definitions.iter().find(|d| d.id == entry.badge_id) {
                joined.push((entry, def.clone()));
            }
        }
        Ok(joined)
    }

    /// Award any publication-count badges the author now qualifies for.
    pub async fn award_for_publications(&self, author_id: &str) -> AppResult<()> {
        let published = self.article_repo.count_published_by_author(author_id).await?;
        self.award_reached(author_id, BadgeKind::Publications, published)
            .await
    }

    /// Award any likes-received badges the author now qualifies for.
    pub async fn award_for_likes(&self, author_id: &str) -> AppResult<()> {
        let likes = self.engagement_repo.count_likes_received(author_id).await?;
        self.award_reached(author_id, BadgeKind::LikesReceived, likes)
            .await
    }

    async fn award_reached(&self, user_id: &str, kind: BadgeKind, count: u64) -> AppResult<()> {
        let badges = self.badge_repo.list_by_kind(kind).await?;
        for badge in badges {
            if count >= u64::try_from(badge.threshold).unwrap_or(u64::MAX) {
                self.badge_repo.award(user_id, &badge.id).await?;
            }
        }
        Ok(())
    }
}
