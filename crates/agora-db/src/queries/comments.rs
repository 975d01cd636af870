use agora_types::models::{
    CategoryId, Comment, CommentId, CommentUpdate, NewComment, Page, PostId, UserId,
};
use chrono::Utc;
use rusqlite::{Connection, Params, params};

use super::{OptionalExt, expect_affected};
use crate::Database;
use crate::error::StoreResult;
use crate::rows::map_row;

const COMMENT_COLUMNS: &str =
    "id, post_id, owner_id, parent_comment_id, text, image, created_at, updated_at, edited";

impl Database {
    pub async fn create_comment(
        &self,
        post_id: PostId,
        owner_id: UserId,
        comment: NewComment,
    ) -> StoreResult<Comment> {
        self.call(move |conn| {
            let sql = format!(
                "INSERT INTO comments (post_id, owner_id, text, image, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 RETURNING {COMMENT_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                params![post_id, owner_id, comment.text, comment.image, Utc::now()],
                map_row,
            )?)
        })
        .await
    }

    /// Reply to `parent_id`. The reply's post is taken from the parent in the
    /// same statement; `NoRows` if the parent does not exist.
    pub async fn create_reply(
        &self,
        parent_id: CommentId,
        owner_id: UserId,
        comment: NewComment,
    ) -> StoreResult<Comment> {
        self.call(move |conn| {
            let sql = format!(
                "INSERT INTO comments
                    (post_id, owner_id, parent_comment_id, text, image, created_at, updated_at)
                 SELECT post_id, ?1, id, ?2, ?3, ?4, ?4 FROM comments WHERE id = ?5
                 RETURNING {COMMENT_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                params![owner_id, comment.text, comment.image, Utc::now(), parent_id],
                map_row,
            )?)
        })
        .await
    }

    pub async fn get_comment(&self, id: CommentId) -> StoreResult<Option<Comment>> {
        self.call(move |conn| {
            let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1");
            conn.query_row(&sql, [id], map_row).optional()
        })
        .await
    }

    /// Every comment on the post, replies included, oldest first.
    pub async fn list_comments_by_post(
        &self,
        post_id: PostId,
        page: Page,
    ) -> StoreResult<Vec<Comment>> {
        self.call(move |conn| {
            query_comments(
                conn,
                "post_id = ?1 ORDER BY id ASC",
                params![post_id, page.limit, page.offset],
            )
        })
        .await
    }

    pub async fn list_replies(
        &self,
        parent_id: CommentId,
        page: Page,
    ) -> StoreResult<Vec<Comment>> {
        self.call(move |conn| {
            query_comments(
                conn,
                "parent_comment_id = ?1 ORDER BY id ASC",
                params![parent_id, page.limit, page.offset],
            )
        })
        .await
    }

    pub async fn list_comments_by_owner(
        &self,
        owner_id: UserId,
        page: Page,
    ) -> StoreResult<Vec<Comment>> {
        self.call(move |conn| {
            query_comments(
                conn,
                "owner_id = ?1 ORDER BY id DESC",
                params![owner_id, page.limit, page.offset],
            )
        })
        .await
    }

    /// The owner's comments on posts in `category_id`, newest first.
    pub async fn list_comments_by_owner_and_category(
        &self,
        owner_id: UserId,
        category_id: CategoryId,
        page: Page,
    ) -> StoreResult<Vec<Comment>> {
        self.call(move |conn| {
            query_comments(
                conn,
                "owner_id = ?1
                   AND post_id IN (SELECT id FROM posts WHERE category_id = ?4)
                 ORDER BY id DESC",
                params![owner_id, page.limit, page.offset, category_id],
            )
        })
        .await
    }

    pub async fn update_comment(
        &self,
        id: CommentId,
        update: CommentUpdate,
    ) -> StoreResult<Comment> {
        self.call(move |conn| {
            let sql = format!(
                "UPDATE comments
                 SET text = ?1, image = ?2, updated_at = ?3, edited = 1
                 WHERE id = ?4
                 RETURNING {COMMENT_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                params![update.text, update.image, Utc::now(), id],
                map_row,
            )?)
        })
        .await
    }

    pub async fn delete_comment(&self, id: CommentId) -> StoreResult<()> {
        self.call(move |conn| {
            expect_affected(conn.execute("DELETE FROM comments WHERE id = ?1", [id])?)
        })
        .await
    }
}

/// `tail` carries the predicate and ordering; `?2`/`?3` are always limit/offset.
fn query_comments(conn: &Connection, tail: &str, params: impl Params) -> StoreResult<Vec<Comment>> {
    let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE {tail} LIMIT ?2 OFFSET ?3");
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params, map_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
