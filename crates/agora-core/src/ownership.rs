use agora_types::models::{Comment, Notification, Post, UserId};
use agora_types::{ForumError, ForumResult};
use tracing::warn;

/// Only the owner may change or remove a resource.
pub fn can_mutate(actor_id: UserId, owner_id: UserId) -> bool {
    actor_id == owner_id
}

/// Something with a single owning user.
pub trait Owned {
    const KIND: &'static str;

    fn owner_id(&self) -> UserId;
    fn resource_id(&self) -> i64;
}

impl Owned for Post {
    const KIND: &'static str = "post";

    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn resource_id(&self) -> i64 {
        self.id
    }
}

impl Owned for Comment {
    const KIND: &'static str = "comment";

    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn resource_id(&self) -> i64 {
        self.id
    }
}

/// The recipient owns a notification, not the actor who caused it.
impl Owned for Notification {
    const KIND: &'static str = "notification";

    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn resource_id(&self) -> i64 {
        self.id
    }
}

pub fn ensure_owner<T: Owned>(actor_id: UserId, resource: &T) -> ForumResult<()> {
    if can_mutate(actor_id, resource.owner_id()) {
        return Ok(());
    }
    warn!(
        "User {} denied access to {} {} owned by {}",
        actor_id,
        T::KIND,
        resource.resource_id(),
        resource.owner_id()
    );
    Err(ForumError::forbidden(format!("you do not own this {}", T::KIND)))
}
