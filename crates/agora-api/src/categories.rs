use axum::{Extension, extract::State, response::IntoResponse};

use agora_types::api::{CategoryResponse, CreateCategoryRequest, CreatePostRequest, PageQuery};
use agora_types::models::NewPost;

use crate::error::ApiResult;
use crate::extract::{Id, ValidJson, ValidQuery};
use crate::middleware::AuthUser;
use crate::response::{created, ok};
use crate::state::AppState;
use crate::views::{comment_views, post_view, post_views};

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let categories = state.forum.categories.list().await?;
    Ok(ok(categories
        .into_iter()
        .map(CategoryResponse::from)
        .collect::<Vec<_>>()))
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = state.forum.categories.create(&req.category).await?;
    Ok(created(CategoryResponse::from(category)))
}

/// GET /categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<impl IntoResponse> {
    let category = state.forum.categories.get(id).await?;
    Ok(ok(CategoryResponse::from(category)))
}

/// GET /categories/{id}/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(category_id): Id,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    forum.categories.get(category_id).await?;
    let posts = forum
        .posts
        .list_by_category(category_id, page.page())
        .await?;
    Ok(ok(post_views(forum, user_id, posts).await?))
}

/// POST /categories/{id}/posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(category_id): Id,
    ValidJson(req): ValidJson<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let post = forum
        .posts
        .create(
            user_id,
            category_id,
            NewPost {
                headline: req.headline,
                text: req.text,
                image: req.image,
            },
        )
        .await?;
    Ok(created(post_view(forum, user_id, post).await?))
}

/// GET /categories/{id}/posts/user: the caller's posts in this category.
pub async fn my_posts_in_category(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(category_id): Id,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let posts = forum
        .posts
        .list_by_owner_and_category(user_id, category_id, page.page())
        .await?;
    Ok(ok(post_views(forum, user_id, posts).await?))
}

/// GET /categories/{id}/comments/user
pub async fn my_comments_in_category(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(category_id): Id,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let forum = &state.forum;
    let comments = forum
        .comments
        .list_by_owner_and_category(user_id, category_id, page.page())
        .await?;
    Ok(ok(comment_views(forum, user_id, comments).await?))
}
