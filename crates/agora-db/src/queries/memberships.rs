use agora_types::models::{Category, CategoryId, Membership, UserId};
use chrono::Utc;
use rusqlite::params;

use super::expect_affected;
use crate::Database;
use crate::error::StoreResult;
use crate::rows::map_row;

impl Database {
    /// Subscribe `user_id` to `category_id`. A repeated subscribe leaves the
    /// existing row in place and returns it.
    pub async fn subscribe(
        &self,
        user_id: UserId,
        category_id: CategoryId,
    ) -> StoreResult<Membership> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO memberships (category_id, user_id, joined_date)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (category_id, user_id) DO NOTHING",
                params![category_id, user_id, Utc::now()],
            )?;
            let membership = tx.query_row(
                "SELECT id, category_id, user_id, joined_date
                 FROM memberships WHERE category_id = ?1 AND user_id = ?2",
                [category_id, user_id],
                map_row,
            )?;
            tx.commit()?;
            Ok(membership)
        })
        .await
    }

    pub async fn unsubscribe(&self, user_id: UserId, category_id: CategoryId) -> StoreResult<()> {
        self.call(move |conn| {
            expect_affected(conn.execute(
                "DELETE FROM memberships WHERE category_id = ?1 AND user_id = ?2",
                [category_id, user_id],
            )?)
        })
        .await
    }

    pub async fn list_subscribed_categories(&self, user_id: UserId) -> StoreResult<Vec<Category>> {
        self.call(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT c.id, c.name
                 FROM categories c
                 JOIN memberships m ON m.category_id = c.id
                 WHERE m.user_id = ?1
                 ORDER BY c.name",
            )?;
            let rows = stmt
                .query_map([user_id], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }
}
