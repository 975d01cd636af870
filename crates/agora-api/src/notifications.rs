use axum::{Extension, extract::State, response::IntoResponse};

use agora_types::api::{NotificationResponse, PageQuery};
use agora_types::models::{MAX_PAGE_LIMIT, NotificationStatus};

use crate::error::ApiResult;
use crate::extract::{Id, ValidQuery};
use crate::middleware::AuthUser;
use crate::response::ok;
use crate::state::AppState;

async fn list(
    state: &AppState,
    user_id: i64,
    status: Option<NotificationStatus>,
    page: &PageQuery,
) -> ApiResult<Vec<NotificationResponse>> {
    let list = state
        .forum
        .notifications
        .list(user_id, status, page.page_or(MAX_PAGE_LIMIT))
        .await?;
    Ok(list.into_iter().map(NotificationResponse::from).collect())
}

/// GET /notifications
pub async fn list_all(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(ok(list(&state, user_id, None, &page).await?))
}

/// GET /notifications/read
pub async fn list_read(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(ok(
        list(&state, user_id, Some(NotificationStatus::Read), &page).await?
    ))
}

/// GET /notifications/unread
pub async fn list_unread(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(ok(
        list(&state, user_id, Some(NotificationStatus::Unread), &page).await?
    ))
}

/// PUT /notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
) -> ApiResult<impl IntoResponse> {
    let n = state
        .forum
        .notifications
        .set_status_as(user_id, id, NotificationStatus::Read)
        .await?;
    Ok(ok(NotificationResponse::from(n)))
}

/// PUT /notifications/{id}/unread
pub async fn mark_unread(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Id(id): Id,
) -> ApiResult<impl IntoResponse> {
    let n = state
        .forum
        .notifications
        .set_status_as(user_id, id, NotificationStatus::Unread)
        .await?;
    Ok(ok(NotificationResponse::from(n)))
}
