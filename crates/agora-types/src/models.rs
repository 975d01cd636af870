use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;
pub type CategoryId = i64;
pub type ReactionTypeId = i64;
pub type NotificationId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted bearer token. Rows are never updated, only inserted and deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: i64,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub owner_id: UserId,
    pub category_id: CategoryId,
    pub headline: String,
    pub text: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set the first time the post is updated.
    pub edited: bool,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub headline: String,
    pub text: Option<String>,
    pub image: Option<String>,
}

/// Full replacement of the editable fields of a post.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub headline: String,
    pub text: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub owner_id: UserId,
    pub parent_comment_id: Option<CommentId>,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub edited: bool,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommentUpdate {
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionType {
    pub id: ReactionTypeId,
    pub name: String,
    pub image: Option<String>,
}

/// What a reaction is attached to. Post and comment reactions live in
/// separate tables and never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReactionTarget {
    Post(PostId),
    Comment(CommentId),
}

impl ReactionTarget {
    pub fn id(&self) -> i64 {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: i64,
    pub target: ReactionTarget,
    pub owner_id: UserId,
    pub reaction_type_id: ReactionTypeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: i64,
    pub category_id: CategoryId,
    pub user_id: UserId,
    pub joined_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Post,
    Comment,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Post => "post",
            ComponentType::Comment => "comment",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(ComponentType::Post),
            "comment" => Ok(ComponentType::Comment),
            other => Err(format!("unknown component type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Unread,
    Read,
}

impl NotificationStatus {
    pub fn is_read(self) -> bool {
        matches!(self, NotificationStatus::Read)
    }
}

impl From<bool> for NotificationStatus {
    fn from(read: bool) -> Self {
        if read {
            NotificationStatus::Read
        } else {
            NotificationStatus::Unread
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Recipient. Only the owner may change the read state.
    pub owner_id: UserId,
    /// The user whose action produced the notification.
    pub actor_id: UserId,
    pub component_type: ComponentType,
    pub component_id: i64,
    pub notification_type: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub owner_id: UserId,
    pub actor_id: UserId,
    pub component_type: ComponentType,
    pub component_id: i64,
    pub notification_type: String,
}

pub const DEFAULT_PAGE_LIMIT: u32 = 100;
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Limit/offset window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset,
        }
    }

    pub fn all() -> Self {
        Self::new(MAX_PAGE_LIMIT, 0)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_is_clamped() {
        assert_eq!(Page::new(0, 3).limit, 1);
        assert_eq!(Page::new(5000, 0).limit, MAX_PAGE_LIMIT);
        assert_eq!(Page::new(20, 40), Page { limit: 20, offset: 40 });
    }

    #[test]
    fn component_type_parses_known_tags_only() {
        assert_eq!("post".parse::<ComponentType>(), Ok(ComponentType::Post));
        assert_eq!("comment".parse::<ComponentType>(), Ok(ComponentType::Comment));
        assert!("reply".parse::<ComponentType>().is_err());
    }

    #[test]
    fn token_liveness_is_strict() {
        let now = Utc::now();
        let token = Token {
            id: 1,
            user_id: 1,
            token: "t".into(),
            expires_at: now,
        };
        assert!(!token.is_live_at(now));
        assert!(token.is_live_at(now - chrono::Duration::seconds(1)));
    }
}
