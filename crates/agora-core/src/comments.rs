use agora_db::{Database, StoreError};
use agora_types::models::{
    CategoryId, Comment, CommentId, CommentUpdate, NewComment, Page, PostId, UserId,
};
use agora_types::{ForumError, ForumResult};
use tracing::info;

use crate::Found;
use crate::ownership::ensure_owner;
use crate::validation::require;

#[derive(Clone)]
pub struct Comments {
    db: Database,
}

impl Comments {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        owner_id: UserId,
        post_id: PostId,
        comment: NewComment,
    ) -> ForumResult<Comment> {
        require("text", &comment.text)?;
        self.db.get_post(post_id).await.found("post")?;
        match self.db.create_comment(post_id, owner_id, comment).await {
            Ok(c) => Ok(c),
            Err(StoreError::InvalidReference) => Err(ForumError::not_found("post")),
            Err(e) => Err(e.into()),
        }
    }

    /// Reply to an existing comment; the reply lands on the parent's post.
    pub async fn reply(
        &self,
        owner_id: UserId,
        parent_id: CommentId,
        comment: NewComment,
    ) -> ForumResult<Comment> {
        require("text", &comment.text)?;
        match self.db.create_reply(parent_id, owner_id, comment).await {
            Ok(c) => Ok(c),
            Err(StoreError::NoRows | StoreError::InvalidReference) => {
                Err(ForumError::not_found("parent comment"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: CommentId) -> ForumResult<Comment> {
        self.db.get_comment(id).await.found("comment")
    }

    pub async fn list_by_post(&self, post_id: PostId, page: Page) -> ForumResult<Vec<Comment>> {
        self.db.get_post(post_id).await.found("post")?;
        Ok(self.db.list_comments_by_post(post_id, page).await?)
    }

    pub async fn list_replies(
        &self,
        parent_id: CommentId,
        page: Page,
    ) -> ForumResult<Vec<Comment>> {
        self.get(parent_id).await?;
        Ok(self.db.list_replies(parent_id, page).await?)
    }

    pub async fn list_by_owner(&self, owner_id: UserId, page: Page) -> ForumResult<Vec<Comment>> {
        Ok(self.db.list_comments_by_owner(owner_id, page).await?)
    }

    pub async fn list_by_owner_and_category(
        &self,
        owner_id: UserId,
        category_id: CategoryId,
        page: Page,
    ) -> ForumResult<Vec<Comment>> {
        Ok(self
            .db
            .list_comments_by_owner_and_category(owner_id, category_id, page)
            .await?)
    }

    pub async fn update(
        &self,
        actor_id: UserId,
        id: CommentId,
        update: CommentUpdate,
    ) -> ForumResult<Comment> {
        require("text", &update.text)?;
        let existing = self.get(id).await?;
        ensure_owner(actor_id, &existing)?;
        self.db.update_comment(id, update).await.map_err(|e| match e {
            StoreError::NoRows => ForumError::not_found("comment"),
            other => other.into(),
        })
    }

    /// Owner-only; replies and reactions go with the comment.
    pub async fn delete(&self, actor_id: UserId, id: CommentId) -> ForumResult<()> {
        let existing = self.get(id).await?;
        ensure_owner(actor_id, &existing)?;
        match self.db.delete_comment(id).await {
            Ok(()) => {
                info!("User {} deleted comment {}", actor_id, id);
                Ok(())
            }
            Err(StoreError::NoRows) => Err(ForumError::not_found("comment")),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, fixture};
    use agora_types::ErrorKind;

    fn text(body: &str) -> NewComment {
        NewComment {
            text: body.into(),
            image: None,
        }
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_comment() {
        let Fixture { _dir, forum, .. } = fixture().await;
        let a = forum.test_user("alice").await;
        let b = forum.test_user("bob").await;
        let post = forum.test_post(a.id, "hello").await;
        let comment = forum.comments.create(a.id, post.id, text("mine")).await.unwrap();

        let err = forum.comments.delete(b.id, comment.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        let err = forum
            .comments
            .update(
                b.id,
                comment.id,
                CommentUpdate {
                    text: "theirs".into(),
                    image: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let still = forum.comments.get(comment.id).await.unwrap();
        assert_eq!(still.text, "mine");
        assert!(!still.edited);
    }

    #[tokio::test]
    async fn replies_inherit_post_and_follow_parent_deletion() {
        let Fixture { _dir, forum, .. } = fixture().await;
        let a = forum.test_user("alice").await;
        let b = forum.test_user("bob").await;
        let post = forum.test_post(a.id, "hello").await;
        let parent = forum.comments.create(a.id, post.id, text("top")).await.unwrap();

        let reply = forum.comments.reply(b.id, parent.id, text("re")).await.unwrap();
        assert_eq!(reply.post_id, post.id);
        assert_eq!(reply.parent_comment_id, Some(parent.id));
        assert_eq!(
            forum.comments.list_replies(parent.id, Page::default()).await.unwrap().len(),
            1
        );

        forum.comments.delete(a.id, parent.id).await.unwrap();
        assert_eq!(
            forum.comments.get(reply.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn comment_validation_and_missing_targets() {
        let Fixture { _dir, forum, .. } = fixture().await;
        let a = forum.test_user("alice").await;
        let post = forum.test_post(a.id, "hello").await;

        let empty = forum.comments.create(a.id, post.id, text("")).await.unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::Validation);

        let no_post = forum.comments.create(a.id, post.id + 9, text("x")).await.unwrap_err();
        assert_eq!(no_post.message(), "post not found");

        let no_parent = forum.comments.reply(a.id, 321, text("x")).await.unwrap_err();
        assert_eq!(no_parent.message(), "parent comment not found");
    }

    #[tokio::test]
    async fn owner_listings() {
        let Fixture { _dir, forum, .. } = fixture().await;
        let a = forum.test_user("alice").await;
        let post = forum.test_post(a.id, "hello").await;
        let first = forum.comments.create(a.id, post.id, text("1")).await.unwrap();
        let second = forum.comments.create(a.id, post.id, text("2")).await.unwrap();

        let mine = forum.comments.list_by_owner(a.id, Page::default()).await.unwrap();
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);

        let in_cat = forum
            .comments
            .list_by_owner_and_category(a.id, post.category_id, Page::default())
            .await
            .unwrap();
        assert_eq!(in_cat.len(), 2);

        let on_post = forum.comments.list_by_post(post.id, Page::default()).await.unwrap();
        assert_eq!(on_post[0].id, first.id);
    }
}
