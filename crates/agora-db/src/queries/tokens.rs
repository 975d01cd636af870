use agora_types::models::{Token, UserId};
use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{OptionalExt, expect_affected};
use crate::Database;
use crate::error::StoreResult;
use crate::rows::map_row;

impl Database {
    pub async fn insert_token(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Token> {
        let token = token.to_owned();
        self.call(move |conn| {
            Ok(conn.query_row(
                "INSERT INTO tokens (user_id, token, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, user_id, token, expires_at",
                params![user_id, token, expires_at.timestamp(), Utc::now()],
                map_row,
            )?)
        })
        .await
    }

    pub async fn get_token(&self, token: &str) -> StoreResult<Option<Token>> {
        let token = token.to_owned();
        self.call(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, user_id, token, expires_at FROM tokens WHERE token = ?1",
            )?;
            stmt.query_row([&token], map_row).optional()
        })
        .await
    }

    pub async fn delete_token(&self, token: &str) -> StoreResult<()> {
        let token = token.to_owned();
        self.call(move |conn| {
            expect_affected(conn.execute("DELETE FROM tokens WHERE token = ?1", [&token])?)
        })
        .await
    }

    /// Delete every token that expired strictly before `cutoff`. Returns how many went.
    pub async fn purge_expired_tokens(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        self.call(move |conn| {
            Ok(conn.execute(
                "DELETE FROM tokens WHERE expires_at < ?1",
                [cutoff.timestamp()],
            )?)
        })
        .await
    }
}
