//! Notification service.
//!
//! Inserts are best-effort from the caller's point of view: lifecycle
//! code wraps `notify` in `if let Err(..) { tracing::warn!(..) }` so a
//! failed insert never aborts the transition that triggered it.

use curio_common::{AppError, AppResult, IdGenerator};
use curio_db::{
    entities::notification::{self, NotificationKind},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Everything needed to emit one notification.
pub struct NotifyInput {
    pub recipient_id: String,
    pub actor_id: Option<String>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Emit one notification. Self-notification is skipped silently.
    pub async fn notify(&self, input: NotifyInput) -> AppResult<Option<notification::Model>> {
        if input.actor_id.as_deref() == Some(input.recipient_id.as_str()) {
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(input.recipient_id),
            actor_id: Set(input.actor_id),
            kind: Set(input.kind),
            title: Set(input.title),
            message: Set(input.message),
            link: Set(input.link),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await.map(Some)
    }

    /// Notifications for a user, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .list_by_recipient(user_id, unread_only, limit, offset)
            .await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark one notification read. NotFound covers both a missing row
    /// and a row belonging to someone else.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let rows = self
            .notification_repo
            .mark_read(notification_id, user_id)
            .await?;
        if rows == 0 {
            return Err(AppError::NotFound(format!(
                "Notification not found: {notification_id}"
            )));
        }
        Ok(())
    }

    /// Mark all of a user's notifications read. Returns how many changed.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_read(user_id).await
    }

    /// Clear the whole inbox. Returns how many rows went.
    pub async fn delete_all(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.delete_all(user_id).await
    }

    /// Delete one notification, ownership checked.
    pub async fn delete(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let rows = self
            .notification_repo
            .delete(notification_id, user_id)
            .await?;
        if rows == 0 {
            return Err(AppError::NotFound(format!(
                "Notification not found: {notification_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: sea_orm::DatabaseConnection) -> NotificationService {
        NotificationService::new(NotificationRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn test_self_notification_is_skipped() {
        // No query results queued: an insert attempt would panic the mock.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);

        let result = svc
            .notify(NotifyInput {
                recipient_id: "user1".to_string(),
                actor_id: Some("user1".to_string()),
                kind: NotificationKind::Like,
                title: "Like".to_string(),
                message: "You liked your own article".to_string(),
                link: None,
            })
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_mark_read_other_users_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let svc = service(db);

        let result = svc.mark_read("user1", "n1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
