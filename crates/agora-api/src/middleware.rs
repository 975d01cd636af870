use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use agora_types::ForumError;
use agora_types::models::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// The raw bearer token of the current request, for logout.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Validate `Authorization: Bearer <token>` against signature and token store.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            debug!("No bearer token on {} {}", req.method(), req.uri().path());
            ForumError::unauthenticated("missing or malformed authorization header")
        })?;

    let user_id = state.forum.auth.validate(&token).await?;

    req.extensions_mut().insert(AuthUser(user_id));
    req.extensions_mut().insert(BearerToken(token));
    Ok(next.run(req).await)
}
