use agora_db::{Database, StoreError};
use agora_types::models::{Category, CategoryId, Membership, UserId};
use agora_types::{ForumError, ForumResult};
use tracing::info;

use crate::Found;
use crate::validation::require;

#[derive(Clone)]
pub struct Categories {
    db: Database,
}

impl Categories {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, name: &str) -> ForumResult<Category> {
        require("category", name)?;
        match self.db.create_category(name).await {
            Ok(category) => {
                info!("Created category {} ({})", category.name, category.id);
                Ok(category)
            }
            Err(StoreError::Conflict(_)) => Err(ForumError::conflict("category already exists")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: CategoryId) -> ForumResult<Category> {
        self.db.get_category(id).await.found("category")
    }

    pub async fn list(&self) -> ForumResult<Vec<Category>> {
        Ok(self.db.list_categories().await?)
    }

    /// Join the named category. Joining twice returns the existing membership.
    pub async fn subscribe(&self, user_id: UserId, name: &str) -> ForumResult<Membership> {
        require("category", name)?;
        let category = self.db.get_category_by_name(name).await.found("category")?;
        match self.db.subscribe(user_id, category.id).await {
            Ok(m) => Ok(m),
            Err(StoreError::InvalidReference) => Err(ForumError::not_found("category")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn unsubscribe(&self, user_id: UserId, category_id: CategoryId) -> ForumResult<()> {
        if category_id <= 0 {
            return Err(ForumError::validation("category_id is required"));
        }
        match self.db.unsubscribe(user_id, category_id).await {
            Ok(()) => Ok(()),
            Err(StoreError::NoRows) => Err(ForumError::not_found("subscription")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn subscriptions(&self, user_id: UserId) -> ForumResult<Vec<Category>> {
        Ok(self.db.list_subscribed_categories(user_id).await?)
    }
}
