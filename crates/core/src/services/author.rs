//! Author application workflow.
//!
//! Readers apply for the `author` role; an admin approves (role flips),
//! rejects (profile removed) or later suspends (role drops back).

use crate::services::{NotificationService, NotifyInput, UserService};
use crate::services::user::ensure_admin;
use curio_common::{AppError, AppResult};
use curio_db::{
    entities::{
        author_profile::{self, AuthorStatus},
        notification::NotificationKind,
        user::{self, Role},
    },
    repositories::AuthorProfileRepository,
};
use sea_orm::Set;
use validator::Validate;

/// Input for applying to become an author.
#[derive(Debug, Default, Validate)]
pub struct ApplyForAuthorInput {
    #[validate(length(max = 100, message = "Pen name too long"))]
    pub pen_name: Option<String>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
}

/// Author service for business logic.
#[derive(Clone)]
pub struct AuthorService {
    profile_repo: AuthorProfileRepository,
    user_service: UserService,
    notification_service: NotificationService,
}

impl AuthorService {
    /// Create a new author service.
    #[must_use]
    pub const fn new(
        profile_repo: AuthorProfileRepository,
        user_service: UserService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            profile_repo,
            user_service,
            notification_service,
        }
    }

    /// Apply for the author role.
    pub async fn apply(
        &self,
        applicant: &user::Model,
        input: ApplyForAuthorInput,
    ) -> AppResult<author_profile::Model> {
        input.validate()?;

        if applicant.role != Role::User {
            return Err(AppError::Conflict("Already an author".to_string()));
        }
        if self.profile_repo.find_by_user(&applicant.id).await?.is_some() {
            return Err(AppError::Conflict(
                "An application already exists".to_string(),
            ));
        }

        let model = author_profile::ActiveModel {
            user_id: Set(applicant.id.clone()),
            author_status: Set(AuthorStatus::Pending),
            pen_name: Set(input.pen_name),
            website: Set(input.website),
            applied_at: Set(chrono::Utc::now().into()),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
        };
        self.profile_repo.create(model).await
    }

    /// One's own application, if any.
    pub async fn own_application(
        &self,
        applicant: &user::Model,
    ) -> AppResult<Option<author_profile::Model>> {
        self.profile_repo.find_by_user(&applicant.id).await
    }

    /// The admin review queue, oldest application first.
    pub async fn list_pending(
        &self,
        admin: &user::Model,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<author_profile::Model>> {
        ensure_admin(admin)?;
        self.profile_repo.list_pending(limit, offset).await
    }

    /// Approve a pending application: profile flips to `approved` and
    /// the user becomes an `author`.
    pub async fn approve(
        &self,
        admin: &user::Model,
        applicant_id: &str,
    ) -> AppResult<author_profile::Model> {
        ensure_admin(admin)?;

        let profile = self.profile_repo.get_by_user(applicant_id).await?;
        if profile.author_status != AuthorStatus::Pending {
            return Err(AppError::Conflict("Application already reviewed".to_string()));
        }

        let mut model: author_profile::ActiveModel = profile.into();
        model.author_status = Set(AuthorStatus::Approved);
        model.reviewed_by = Set(Some(admin.id.clone()));
        model.reviewed_at = Set(Some(chrono::Utc::now().into()));
        let updated = self.profile_repo.update(model).await?;

        self.user_service
            .update_role(admin, applicant_id, Role::Author, true)
            .await?;

        let notify = self
            .notification_service
            .notify(NotifyInput {
                recipient_id: applicant_id.to_string(),
                actor_id: Some(admin.id.clone()),
                kind: NotificationKind::Other,
                title: "Author application approved".to_string(),
                message: "You can now publish articles".to_string(),
                link: Some("/articles/new".to_string()),
            })
            .await;
        if let Err(e) = notify {
            tracing::warn!(error = %e, applicant_id, "Failed to emit approval notification");
        }

        Ok(updated)
    }

    /// Reject a pending application. The profile row is removed so the
    /// user can reapply later.
    pub async fn reject(&self, admin: &user::Model, applicant_id: &str) -> AppResult<()> {
        ensure_admin(admin)?;

        let profile = self.profile_repo.get_by_user(applicant_id).await?;
        if profile.author_status != AuthorStatus::Pending {
            return Err(AppError::Conflict("Application already reviewed".to_string()));
        }

        self.profile_repo.delete(applicant_id).await?;

        let notify = self
            .notification_service
            .notify(NotifyInput {
                recipient_id: applicant_id.to_string(),
                actor_id: Some(admin.id.clone()),
                kind: NotificationKind::Other,
                title: "Author application declined".to_string(),
                message: "Your author application was not approved this time".to_string(),
                link: None,
            })
            .await;
        if let Err(e) = notify {
            tracing::warn!(error = %e, applicant_id, "Failed to emit rejection notification");
        }

        Ok(())
    }

    /// Suspend an approved author: profile goes `suspended`, role drops
    /// back to `user`. Existing articles keep their status.
    pub async fn suspend(
        &self,
        admin: &user::Model,
        author_id: &str,
    ) -> AppResult<author_profile::Model> {
        ensure_admin(admin)?;

        let profile = self.profile_repo.get_by_user(author_id).await?;
        if profile.author_status != AuthorStatus::Approved {
            return Err(AppError::Conflict("Author is not approved".to_string()));
        }

        let mut model: author_profile::ActiveModel = profile.into();
        model.author_status = Set(AuthorStatus::Suspended);
        model.reviewed_by = Set(Some(admin.id.clone()));
        model.reviewed_at = Set(Some(chrono::Utc::now().into()));
        let updated = self.profile_repo.update(model).await?;

        self.user_service
            .update_role(admin, author_id, Role::User, true)
            .await?;

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use curio_db::repositories::{NotificationRepository, UserRepository};
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

    fn service(db: sea_orm::DatabaseConnection) -> AuthorService {
        let db = Arc::new(db);
        AuthorService::new(
            AuthorProfileRepository::new(db.clone()),
            UserService::new(UserRepository::new(db.clone())),
            NotificationService::new(NotificationRepository::new(db.clone())),
        )
    }

    #[tokio::test]
    async fn test_existing_author_cannot_apply() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let author = test_user("author1", Role::Author);

        let result = svc.apply(&author, ApplyForAuthorInput::default()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_approve_requires_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let user = test_user("user1", Role::User);

        let result = svc.approve(&user, "applicant1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_approve_already_reviewed_is_conflict() {
        let profile = author_profile::Model {
            user_id: "applicant1".to_string(),
            author_status: AuthorStatus::Approved,
            pen_name: None,
            website: None,
            applied_at: Utc::now().into(),
            reviewed_by: Some("admin1".to_string()),
            reviewed_at: Some(Utc::now().into()),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profile]])
            .into_connection();
        let svc = service(db);
        let admin = test_user("admin1", Role::Admin);

        let result = svc.approve(&admin, "applicant1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
