use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Category, CategoryId, Comment, CommentId, ComponentType, Notification, NotificationId, Page,
    Post, PostId, ReactionType, ReactionTypeId, User, UserId, DEFAULT_PAGE_LIMIT,
};

// -- JWT Claims --

/// Registered claims carried by every bearer token. `sub` is the decimal user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

// -- Common --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        self.page_or(DEFAULT_PAGE_LIMIT)
    }

    /// Like [`PageQuery::page`] with a different limit when none was given.
    pub fn page_or(&self, default_limit: u32) -> Page {
        Page::new(
            self.limit.unwrap_or(default_limit),
            self.offset.unwrap_or(0),
        )
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Either `email` or `username` identifies the account; email wins when both are set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub joined_date: DateTime<Utc>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub user_id: UserId,
    pub valid: bool,
    pub status: String,
}

// -- Users --

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub joined_date: DateTime<Utc>,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: user.email,
            profile_picture: user.profile_picture,
            joined_date: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePictureRequest {
    pub profile_picture: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscribeRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnsubscribeRequest {
    pub category_id: CategoryId,
}

// -- Categories --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub category_id: CategoryId,
    pub category: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            category_id: category.id,
            category: category.name,
        }
    }
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactRequest {
    pub reaction_type_id: ReactionTypeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionInfo {
    pub reaction_type_id: ReactionTypeId,
    pub name: String,
    pub image: Option<String>,
}

impl From<ReactionType> for ReactionInfo {
    fn from(rt: ReactionType) -> Self {
        Self {
            reaction_type_id: rt.id,
            name: rt.name,
            image: rt.image,
        }
    }
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub headline: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub headline: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub post_id: PostId,
    pub owner_id: UserId,
    pub category_id: CategoryId,
    pub headline: String,
    pub text: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_edited: bool,
    pub total_reaction: i64,
    pub user_reaction: Option<ReactionInfo>,
}

impl PostResponse {
    pub fn new(post: Post, total_reaction: i64, user_reaction: Option<ReactionInfo>) -> Self {
        Self {
            post_id: post.id,
            owner_id: post.owner_id,
            category_id: post.category_id,
            headline: post.headline,
            text: post.text,
            image: post.image,
            created_at: post.created_at,
            updated_at: post.updated_at,
            is_edited: post.edited,
            total_reaction,
            user_reaction,
        }
    }
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub parent_comment_id: Option<CommentId>,
    pub comment_owner_username: String,
    pub comment_owner_profile_picture: Option<String>,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_edited: bool,
    pub total_reaction: i64,
    pub user_reaction: Option<ReactionInfo>,
}

impl CommentResponse {
    pub fn new(
        comment: Comment,
        owner: &User,
        total_reaction: i64,
        user_reaction: Option<ReactionInfo>,
    ) -> Self {
        Self {
            comment_id: comment.id,
            post_id: comment.post_id,
            parent_comment_id: comment.parent_comment_id,
            comment_owner_username: owner.username.clone(),
            comment_owner_profile_picture: owner.profile_picture.clone(),
            text: comment.text,
            image: comment.image,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            is_edited: comment.edited,
            total_reaction,
            user_reaction,
        }
    }
}

// -- Notifications --

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub notification_id: NotificationId,
    pub actor_id: UserId,
    pub component_involved: ComponentType,
    pub post_id: Option<PostId>,
    pub comment_id: Option<CommentId>,
    pub notification_type: String,
    /// `true` once read.
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        let (post_id, comment_id) = match n.component_type {
            ComponentType::Post => (Some(n.component_id), None),
            ComponentType::Comment => (None, Some(n.component_id)),
        };
        Self {
            notification_id: n.id,
            actor_id: n.actor_id,
            component_involved: n.component_type,
            post_id,
            comment_id,
            notification_type: n.notification_type,
            status: n.status.is_read(),
            created_at: n.created_at,
        }
    }
}

// -- Uploads --

#[derive(Debug, Deserialize)]
pub struct PresignQuery {
    #[serde(default)]
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresignResponse {
    pub presigned_url: String,
    pub key: String,
    pub expires_in_secs: u64,
}
