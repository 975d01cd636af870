use agora_types::models::{CategoryId, NewPost, Page, Post, PostId, PostUpdate, UserId};
use chrono::Utc;
use rusqlite::{Connection, Params, params};

use super::{OptionalExt, expect_affected};
use crate::Database;
use crate::error::StoreResult;
use crate::rows::map_row;

const POST_COLUMNS: &str =
    "id, owner_id, category_id, headline, text, image, created_at, updated_at, edited";

impl Database {
    pub async fn create_post(
        &self,
        owner_id: UserId,
        category_id: CategoryId,
        post: NewPost,
    ) -> StoreResult<Post> {
        self.call(move |conn| {
            let now = Utc::now();
            let sql = format!(
                "INSERT INTO posts
                    (owner_id, category_id, headline, text, image, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 RETURNING {POST_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                params![owner_id, category_id, post.headline, post.text, post.image, now],
                map_row,
            )?)
        })
        .await
    }

    pub async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        self.call(move |conn| {
            let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1");
            conn.query_row(&sql, [id], map_row).optional()
        })
        .await
    }

    pub async fn list_posts_by_category(
        &self,
        category_id: CategoryId,
        page: Page,
    ) -> StoreResult<Vec<Post>> {
        self.call(move |conn| {
            query_posts(
                conn,
                "category_id = ?1",
                params![category_id, page.limit, page.offset],
            )
        })
        .await
    }

    pub async fn list_posts_by_owner(
        &self,
        owner_id: UserId,
        page: Page,
    ) -> StoreResult<Vec<Post>> {
        self.call(move |conn| {
            query_posts(
                conn,
                "owner_id = ?1",
                params![owner_id, page.limit, page.offset],
            )
        })
        .await
    }

    pub async fn list_posts_by_owner_and_category(
        &self,
        owner_id: UserId,
        category_id: CategoryId,
        page: Page,
    ) -> StoreResult<Vec<Post>> {
        self.call(move |conn| {
            query_posts(
                conn,
                "owner_id = ?1 AND category_id = ?4",
                params![owner_id, page.limit, page.offset, category_id],
            )
        })
        .await
    }

    /// Replace the editable fields, mark the post edited and bump `updated_at`.
    pub async fn update_post(&self, id: PostId, update: PostUpdate) -> StoreResult<Post> {
        self.call(move |conn| {
            let sql = format!(
                "UPDATE posts
                 SET headline = ?1, text = ?2, image = ?3, updated_at = ?4, edited = 1
                 WHERE id = ?5
                 RETURNING {POST_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                params![update.headline, update.text, update.image, Utc::now(), id],
                map_row,
            )?)
        })
        .await
    }

    pub async fn delete_post(&self, id: PostId) -> StoreResult<()> {
        self.call(move |conn| {
            expect_affected(conn.execute("DELETE FROM posts WHERE id = ?1", [id])?)
        })
            .await
    }
}

/// Newest first. `?2`/`?3` are always limit/offset.
fn query_posts(conn: &Connection, predicate: &str, params: impl Params) -> StoreResult<Vec<Post>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE {predicate} ORDER BY id DESC LIMIT ?2 OFFSET ?3"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params, map_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
