use axum::{extract::State, response::IntoResponse};

use agora_types::api::ReactionInfo;

use crate::error::ApiResult;
use crate::response::ok;
use crate::state::AppState;

/// GET /reaction-types
pub async fn reaction_types(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let types = state.forum.reactions.list_types().await?;
    Ok(ok(types.into_iter().map(ReactionInfo::from).collect::<Vec<_>>()))
}
