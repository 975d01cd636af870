use axum::{Extension, extract::State, response::IntoResponse};

use agora_types::api::{
    CreateCommentRequest, MessageResponse, PageQuery, ReactRequest, UpdateCommentRequest,
};
use agora_types::models::{CommentUpdate, NewComment, ReactionTarget};

use crate::error::ApiResult;
use crate::extract::{Id, ValidJson, ValidQuery};
use crate::middleware::AuthUser;
use crate::response::{created, ok};
use crate::state::AppState;
use crate::views::{comment_view, comment_views};

/// GET /comments/{id}
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let comment = forum.comments.get(id).await?;
    Ok(ok(comment_view(forum, user_id, comment).await?))
}

/// PUT /comments/{id}
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
    ValidJson(req): ValidJson<UpdateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let comment = forum
        .comments
        .update(
            user_id,
            id,
            CommentUpdate {
                text: req.text.unwrap_or_default(),
                image: req.image,
            },
        )
        .await?;
    Ok(ok(comment_view(forum, user_id, comment).await?))
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
) -> ApiResult<impl IntoResponse> {
    state.forum.comments.delete(user_id, id).await?;
    Ok(ok(MessageResponse::new("comment deleted")))
}

/// GET /comments/{id}/replies
pub async fn list_replies(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let replies = forum.comments.list_replies(id, page.page()).await?;
    Ok(ok(comment_views(forum, user_id, replies).await?))
}

/// POST /comments/{id}/replies
pub async fn reply(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
    ValidJson(req): ValidJson<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let comment = forum
        .comments
        .reply(
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

/// POST /comments/{id}/react
pub async fn react(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
    ValidJson(req): ValidJson<ReactRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    forum
        .reactions
        .upsert(user_id, ReactionTarget::Comment(id), req.reaction_type_id)
        .await?;
    let comment = forum.comments.get(id).await?;
    Ok(ok(comment_view(forum, user_id, comment).await?))
}
