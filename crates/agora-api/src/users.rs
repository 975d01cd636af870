use axum::{Extension, extract::State, response::IntoResponse};

use agora_types::api::{
    AccountResponse, CategoryResponse, MessageResponse, PageQuery, ProfilePictureRequest,
    SubscribeRequest, UnsubscribeRequest, UpdateUsernameRequest,
};

use crate::error::ApiResult;
use crate::extract::{Id, ValidJson, ValidQuery};
use crate::middleware::AuthUser;
use crate::response::{created, ok};
use crate::state::AppState;
use crate::views::{comment_views, post_views};

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<impl IntoResponse> {
    let user = state.forum.accounts.get(id).await?;
    Ok(ok(AccountResponse::from(user)))
}

/// PUT /user/username
pub async fn update_username(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidJson(req): ValidJson<UpdateUsernameRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .forum
        .accounts
        .update_username(user_id, &req.username)
        .await?;
    Ok(ok(AccountResponse::from(user)))
}

/// PUT /user/profile-picture
pub async fn set_profile_picture(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidJson(req): ValidJson<ProfilePictureRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .forum
        .accounts
        .set_profile_picture(user_id, Some(&req.profile_picture))
        .await?;
    Ok(ok(AccountResponse::from(user)))
}

/// DELETE /user/profile-picture
pub async fn clear_profile_picture(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state.forum.accounts.set_profile_picture(user_id, None).await?;
    Ok(ok(AccountResponse::from(user)))
}

/// DELETE /user
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    state.forum.accounts.delete(user_id).await?;
    Ok(ok(MessageResponse::new("account deleted")))
}

/// POST /user/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidJson(req): ValidJson<SubscribeRequest>,
) -> ApiResult<impl IntoResponse> {
    let membership = state
        .forum
        .categories
        .subscribe(user_id, &req.category)
        .await?;
    Ok(created(membership))
}

/// POST /user/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidJson(req): ValidJson<UnsubscribeRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .forum
        .categories
        .unsubscribe(user_id, req.category_id)
        .await?;
    Ok(ok(MessageResponse::new("unsubscribed")))
}

/// GET /user/categories
pub async fn my_categories(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let categories = state.forum.categories.subscriptions(user_id).await?;
    Ok(ok(categories
        .into_iter()
        .map(CategoryResponse::from)
        .collect::<Vec<_>>()))
}

/// GET /user/posts
pub async fn my_posts(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let posts = forum.posts.list_by_owner(user_id, page.page()).await?;
    Ok(ok(post_views(forum, user_id, posts).await?))
}

/// GET /user/comments
pub async fn my_comments(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let comments = forum.comments.list_by_owner(user_id, page.page()).await?;
    Ok(ok(comment_views(forum, user_id, comments).await?))
}
