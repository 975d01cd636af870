use agora_types::models::{User, UserId};
use chrono::Utc;
use rusqlite::{Connection, params};

use super::{OptionalExt, expect_affected};
use crate::Database;
use crate::error::StoreResult;
use crate::rows::map_row;

const USER_COLUMNS: &str = "id, username, email, password_hash, profile_picture, created_at";

impl Database {
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let (username, email, password_hash) =
            (username.to_owned(), email.to_owned(), password_hash.to_owned());
        self.call(move |conn| {
            let sql = format!(
                "INSERT INTO users (username, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {USER_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                params![username, email, password_hash, Utc::now()],
                map_row,
            )?)
        })
        .await
    }

    pub async fn get_user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.call(move |conn| query_user_where(conn, "id = ?1", &id)).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let username = username.to_owned();
        self.call(move |conn| query_user_where(conn, "username = ?1", &username))
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_owned();
        self.call(move |conn| query_user_where(conn, "email = ?1", &email))
            .await
    }

    pub async fn update_username(&self, id: UserId, username: &str) -> StoreResult<User> {
        let username = username.to_owned();
        self.call(move |conn| {
            let sql =
                format!("UPDATE users SET username = ?1 WHERE id = ?2 RETURNING {USER_COLUMNS}");
            Ok(conn.query_row(&sql, params![username, id], map_row)?)
        })
        .await
    }

    /// `None` clears the picture.
    pub async fn set_profile_picture(
        &self,
        id: UserId,
        picture: Option<String>,
    ) -> StoreResult<User> {
        self.call(move |conn| {
            let sql = format!(
                "UPDATE users SET profile_picture = ?1 WHERE id = ?2 RETURNING {USER_COLUMNS}"
            );
            Ok(conn.query_row(&sql, params![picture, id], map_row)?)
        })
        .await
    }

    /// Removes the user and, through cascades, everything they own.
    pub async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        self.call(move |conn| {
            expect_affected(conn.execute("DELETE FROM users WHERE id = ?1", [id])?)
        })
            .await
    }
}

fn query_user_where(
    conn: &Connection,
    predicate: &str,
    value: &dyn rusqlite::ToSql,
) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
    let mut stmt = conn.prepare_cached(&sql)?;
    stmt.query_row([value], map_row).optional()
}

#[cfg(test)]
mod tests {
    use crate::StoreError;
    use crate::test_support::open_temp;

    #[tokio::test]
    async fn usernames_and_emails_are_unique() {
        let (_dir, db) = open_temp().await;
        let alice = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        assert!(alice.id > 0);

        let dup_name = db.create_user("alice", "other@example.com", "hash").await;
        assert!(matches!(dup_name, Err(StoreError::Conflict(_))));

        let dup_email = db.create_user("bob", "alice@example.com", "hash").await;
        assert!(matches!(dup_email, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn lookups_by_each_identifier() {
        let (_dir, db) = open_temp().await;
        let alice = db.create_user("alice", "alice@example.com", "hash").await.unwrap();

        let by_email = db.get_user_by_email("alice@example.com").await.unwrap().unwrap();
        let by_name = db.get_user_by_username("alice").await.unwrap().unwrap();
        let by_id = db.get_user_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(by_email.id, alice.id);
        assert_eq!(by_name.id, alice.id);
        assert_eq!(by_id.password_hash, "hash");
        assert!(db.get_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_updates_and_deletion() {
        let (_dir, db) = open_temp().await;
        let alice = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        db.create_user("bob", "bob@example.com", "hash").await.unwrap();

        let renamed = db.update_username(alice.id, "alicia").await.unwrap();
        assert_eq!(renamed.username, "alicia");
        assert!(matches!(
            db.update_username(alice.id, "bob").await,
            Err(StoreError::Conflict(_))
        ));

        let pictured = db
            .set_profile_picture(alice.id, Some("1/me.png".into()))
            .await
            .unwrap();
        assert_eq!(pictured.profile_picture.as_deref(), Some("1/me.png"));
        let cleared = db.set_profile_picture(alice.id, None).await.unwrap();
        assert!(cleared.profile_picture.is_none());

        db.delete_user(alice.id).await.unwrap();
        assert!(matches!(db.delete_user(alice.id).await, Err(StoreError::NoRows)));
    }
}
