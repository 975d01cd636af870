use agora_db::{Database, StoreError};
use agora_types::models::{CategoryId, NewPost, Page, Post, PostId, PostUpdate, UserId};
use agora_types::{ForumError, ForumResult};
use tracing::info;

use crate::Found;
use crate::ownership::ensure_owner;
use crate::validation::require;

#[derive(Clone)]
pub struct Posts {
    db: Database,
}

impl Posts {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        owner_id: UserId,
        category_id: CategoryId,
        post: NewPost,
    ) -> ForumResult<Post> {
        require("headline", &post.headline)?;
        self.db.get_category(category_id).await.found("category")?;
        match self.db.create_post(owner_id, category_id, post).await {
            Ok(post) => Ok(post),
            Err(StoreError::InvalidReference) => Err(ForumError::not_found("category")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: PostId) -> ForumResult<Post> {
        self.db.get_post(id).await.found("post")
    }

    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
        page: Page,
    ) -> ForumResult<Vec<Post>> {
        Ok(self.db.list_posts_by_category(category_id, page).await?)
    }

    pub async fn list_by_owner(&self, owner_id: UserId, page: Page) -> ForumResult<Vec<Post>> {
        Ok(self.db.list_posts_by_owner(owner_id, page).await?)
    }

    pub async fn list_by_owner_and_category(
        &self,
        owner_id: UserId,
        category_id: CategoryId,
        page: Page,
    ) -> ForumResult<Vec<Post>> {
        Ok(self
            .db
            .list_posts_by_owner_and_category(owner_id, category_id, page)
            .await?)
    }

    /// Owner-only. A missing post is reported before ownership is checked.
    pub async fn update(
        &self,
        actor_id: UserId,
        id: PostId,
        update: PostUpdate,
    ) -> ForumResult<Post> {
        require("headline", &update.headline)?;
        let existing = self.get(id).await?;
        ensure_owner(actor_id, &existing)?;
        self.db.update_post(id, update).await.map_err(|e| match e {
            StoreError::NoRows => ForumError::not_found("post"),
            other => other.into(),
        })
    }

    /// Owner-only; comments and reactions go with the post.
    pub async fn delete(&self, actor_id: UserId, id: PostId) -> ForumResult<()> {
        let existing = self.get(id).await?;
        ensure_owner(actor_id, &existing)?;
        match self.db.delete_post(id).await {
            Ok(()) => {
                info!("User {} deleted post {}", actor_id, id);
                Ok(())
            }
            Err(StoreError::NoRows) => Err(ForumError::not_found("post")),
            Err(e) => Err(e.into()),
        }
    }
}
