use agora_types::models::{
    NewNotification, Notification, NotificationId, NotificationStatus, Page, UserId,
};
use chrono::Utc;
use rusqlite::params;

use super::OptionalExt;
use crate::Database;
use crate::error::StoreResult;
use crate::rows::map_row;

const NOTIFICATION_COLUMNS: &str = "id, owner_id, actor_id, component_type, component_id, \
     notification_type, is_read, created_at";

impl Database {
    /// Always inserts a fresh unread row; identical events are not merged.
    pub async fn create_notification(&self, n: NewNotification) -> StoreResult<Notification> {
        self.call(move |conn| {
            let sql = format!(
                "INSERT INTO notifications
                    (owner_id, actor_id, component_type, component_id,
                     notification_type, is_read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
                 RETURNING {NOTIFICATION_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                params![
                    n.owner_id,
                    n.actor_id,
                    n.component_type.as_str(),
                    n.component_id,
                    n.notification_type,
                    Utc::now()
                ],
                map_row,
            )?)
        })
        .await
    }

    pub async fn get_notification(&self, id: NotificationId) -> StoreResult<Option<Notification>> {
        self.call(move |conn| {
            let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1");
            conn.query_row(&sql, [id], map_row).optional()
        })
        .await
    }

    /// Set the read flag. Setting the current value again is a no-op that
    /// still succeeds; a missing id is `NoRows`.
    pub async fn set_notification_status(
        &self,
        id: NotificationId,
        status: NotificationStatus,
    ) -> StoreResult<Notification> {
        self.call(move |conn| {
            let sql = format!(
                "UPDATE notifications SET is_read = ?1 WHERE id = ?2
                 RETURNING {NOTIFICATION_COLUMNS}"
            );
            Ok(conn.query_row(&sql, params![status.is_read(), id], map_row)?)
        })
        .await
    }

    /// Newest first. `status` narrows to read or unread rows.
    pub async fn list_notifications(
        &self,
        owner_id: UserId,
        status: Option<NotificationStatus>,
        page: Page,
    ) -> StoreResult<Vec<Notification>> {
        self.call(move |conn| {
            let sql = format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE owner_id = ?1 AND (?2 IS NULL OR is_read = ?2)
                 ORDER BY id DESC
                 LIMIT ?3 OFFSET ?4"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let read = status.map(NotificationStatus::is_read);
            let rows = stmt
                .query_map(params![owner_id, read, page.limit, page.offset], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use agora_types::models::{ComponentType, NewNotification, NotificationStatus, Page};

    use crate::test_support::open_temp;
    use crate::{Database, StoreError};

    async fn users(db: &Database) -> (i64, i64) {
        let a = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let b = db.create_user("bob", "bob@example.com", "hash").await.unwrap();
        (a.id, b.id)
    }

    fn event(owner: i64, actor: i64, component_id: i64) -> NewNotification {
        NewNotification {
            owner_id: owner,
            actor_id: actor,
            component_type: ComponentType::Post,
            component_id,
            notification_type: "reaction".into(),
        }
    }

    #[tokio::test]
    async fn notifications_start_unread_and_toggle() {
        let (_dir, db) = open_temp().await;
        let (alice, bob) = users(&db).await;
        let n = db.create_notification(event(alice, bob, 1)).await.unwrap();
        assert_eq!(n.status, NotificationStatus::Unread);

        let read = db.set_notification_status(n.id, NotificationStatus::Read).await.unwrap();
        assert_eq!(read.status, NotificationStatus::Read);
        let again = db.set_notification_status(n.id, NotificationStatus::Read).await.unwrap();
        assert_eq!(again.status, NotificationStatus::Read);

        assert!(matches!(
            db.set_notification_status(n.id + 1, NotificationStatus::Read).await,
            Err(StoreError::NoRows)
        ));
    }

    #[tokio::test]
    async fn listing_filters_by_status_newest_first() {
        let (_dir, db) = open_temp().await;
        let (alice, bob) = users(&db).await;
        let first = db.create_notification(event(alice, bob, 1)).await.unwrap();
        let second = db.create_notification(event(alice, bob, 1)).await.unwrap();
        db.create_notification(event(bob, alice, 2)).await.unwrap();
        db.set_notification_status(first.id, NotificationStatus::Read)
            .await
            .unwrap();

        let all = db.list_notifications(alice, None, Page::all()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|n| n.id).collect();
        assert_eq!(ids, [second.id, first.id]);

        let unread = db
            .list_notifications(alice, Some(NotificationStatus::Unread), Page::all())
            .await
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, second.id);

        let read = db
            .list_notifications(alice, Some(NotificationStatus::Read), Page::all())
            .await
            .unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, first.id);
    }
}
