use axum::{Extension, extract::State, response::IntoResponse};

use agora_types::api::{PresignQuery, PresignResponse};

use crate::error::ApiResult;
use crate::extract::ValidQuery;
use crate::middleware::AuthUser;
use crate::response::ok;
use crate::state::AppState;

/// POST /uploads/presign?file_name=
pub async fn presign(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidQuery(query): ValidQuery<PresignQuery>,
) -> ApiResult<impl IntoResponse> {
    let upload = state.forum.uploads.presign(user_id, &query.file_name).await?;
    Ok(ok(PresignResponse {
        presigned_url: upload.url,
        key: upload.key,
        expires_in_secs: upload.expires_in.as_secs(),
    }))
}
