use agora_db::{Database, StoreError};
use agora_types::models::{
    NewNotification, Notification, NotificationId, NotificationStatus, Page, UserId,
};
use agora_types::{ForumError, ForumResult};
use tracing::debug;

use crate::Found;
use crate::ownership::ensure_owner;

/// Per-user notifications with a read/unread flag. Both transitions are
/// always allowed and repeating one is a no-op.
#[derive(Clone)]
pub struct NotificationLedger {
    db: Database,
}

impl NotificationLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record a new unread notification. Nothing is deduplicated.
    pub async fn create(&self, n: NewNotification) -> ForumResult<Notification> {
        if n.notification_type.is_empty() {
            return Err(ForumError::validation("notification_type is required"));
        }
        let created = self.db.create_notification(n).await.map_err(|e| match e {
            StoreError::InvalidReference => ForumError::not_found("user"),
            other => other.into(),
        })?;
        debug!(
            "Notification {} for user {} ({})",
            created.id, created.owner_id, created.notification_type
        );
        Ok(created)
    }

    pub async fn get(&self, id: NotificationId) -> ForumResult<Notification> {
        self.db.get_notification(id).await.found("notification")
    }

    /// Mark read without an ownership check.
    pub async fn mark_read(&self, id: NotificationId) -> ForumResult<Notification> {
        self.set_status(id, NotificationStatus::Read).await
    }

    /// Mark unread without an ownership check.
    pub async fn mark_unread(&self, id: NotificationId) -> ForumResult<Notification> {
        self.set_status(id, NotificationStatus::Unread).await
    }

    /// Change the read flag on behalf of `actor_id`, who must be the recipient.
    pub async fn set_status_as(
        &self,
        actor_id: UserId,
        id: NotificationId,
        status: NotificationStatus,
    ) -> ForumResult<Notification> {
        let existing = self.get(id).await?;
        ensure_owner(actor_id, &existing)?;
        self.set_status(id, status).await
    }

    /// Newest first; `status` keeps only rows in that state.
    pub async fn list(
        &self,
        owner_id: UserId,
        status: Option<NotificationStatus>,
        page: Page,
    ) -> ForumResult<Vec<Notification>> {
        Ok(self.db.list_notifications(owner_id, status, page).await?)
    }

    async fn set_status(
        &self,
        id: NotificationId,
        status: NotificationStatus,
    ) -> ForumResult<Notification> {
        match self.db.set_notification_status(id, status).await {
            Ok(n) => Ok(n),
            Err(StoreError::NoRows) => Err(ForumError::not_found("notification")),
            Err(e) => Err(e.into()),
        }
    }
}
