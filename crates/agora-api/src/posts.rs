use axum::{Extension, extract::State, response::IntoResponse};

use agora_types::api::{
    CreateCommentRequest, MessageResponse, PageQuery, ReactRequest, UpdatePostRequest,
};
use agora_types::models::{NewComment, PostUpdate, ReactionTarget};

use crate::error::ApiResult;
use crate::extract::{Id, ValidJson, ValidQuery};
use crate::middleware::AuthUser;
use crate::response::{created, ok};
use crate::state::AppState;
use crate::views::{comment_view, comment_views, post_view};

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let post = forum.posts.get(id).await?;
    Ok(ok(post_view(forum, user_id, post).await?))
}

/// PUT /posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
    ValidJson(req): ValidJson<UpdatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let post = forum
        .posts
        .update(
            user_id,
            id,
            PostUpdate {
                headline: req.headline,
                text: req.text,
                image: req.image,
            },
        )
        .await?;
    Ok(ok(post_view(forum, user_id, post).await?))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
) -> ApiResult<impl IntoResponse> {
    state.forum.posts.delete(user_id, id).await?;
    Ok(ok(MessageResponse::new("post deleted")))
}

/// POST /posts/{id}/react
pub async fn react(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
    ValidJson(req): ValidJson<ReactRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    forum
        .reactions
        .upsert(user_id, ReactionTarget::Post(id), req.reaction_type_id)
        .await?;
    let post = forum.posts.get(id).await?;
    Ok(ok(post_view(forum, user_id, post).await?))
}

/// GET /posts/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let comments = forum.comments.list_by_post(id, page.page()).await?;
    Ok(ok(comment_views(forum, user_id, comments).await?))
}

/// POST /posts/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
    ValidJson(req): ValidJson<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let comment = forum
        .comments
        .create(
            user_id,
            id,
            NewComment {
                text: req.text.unwrap_or_default(),
                image: req.image,
            },
        )
        .await?;
    Ok(created(comment_view(forum, user_id, comment).await?))
}
