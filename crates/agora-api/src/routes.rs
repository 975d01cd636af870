use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, categories, comments, notifications, posts, reactions, uploads, users};

/// GET /health. Liveness check, no auth.
pub async fn health() -> &'static str {
    "ok"
}

/// Build the full HTTP surface. Everything except health, register and
/// login sits behind the bearer-token middleware.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/verify", get(auth::verify))
        .route("/auth/logout", post(auth::logout))
        .route("/uploads/presign", post(uploads::presign))
        .route("/reaction-types", get(reactions::reaction_types))
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/{id}", get(categories::get_category))
        .route(
            "/categories/{id}/posts",
            get(categories::list_posts).post(categories::create_post),
        )
        .route("/categories/{id}/posts/user", get(categories::my_posts_in_category))
        .route(
            "/categories/{id}/comments/user",
            get(categories::my_comments_in_category),
        )
        // Posts
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/{id}/react", post(posts::react))
        .route(
            "/posts/{id}/comments",
            get(posts::list_comments).post(posts::create_comment),
        )
        // Comments
        .route(
            "/comments/{id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/comments/{id}/replies",
            get(comments::list_replies).post(comments::reply),
        )
        .route("/comments/{id}/react", post(comments::react))
        // Current user
        .route("/user", delete(users::delete_account))
        .route("/user/posts", get(users::my_posts))
        .route("/user/comments", get(users::my_comments))
        .route(
            "/user/comments/category/{id}",
            get(categories::my_comments_in_category),
        )
        .route("/user/categories", get(users::my_categories))
        .route("/user/subscribe", post(users::subscribe))
        .route("/user/unsubscribe", post(users::unsubscribe))
        .route("/user/username", put(users::update_username))
        .route(
            "/user/profile-picture",
            put(users::set_profile_picture).delete(users::clear_profile_picture),
        )
        .route("/users/{id}", get(users::get_user))
        // Notifications
        .route("/notifications", get(notifications::list_all))
        .route("/notifications/read", get(notifications::list_read))
        .route("/notifications/unread", get(notifications::list_unread))
        .route("/notifications/{id}/read", put(notifications::mark_read))
        .route("/notifications/{id}/unread", put(notifications::mark_unread))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
