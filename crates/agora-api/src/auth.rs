use axum::{Extension, extract::State, response::IntoResponse};

use agora_core::{LoginIdentifier, Session};
use agora_types::ForumError;
use agora_types::api::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, VerifyResponse,
};

use crate::error::ApiResult;
use crate::extract::ValidJson;
use crate::middleware::{AuthUser, BearerToken};
use crate::response::{created, ok};
use crate::state::AppState;

fn auth_response(session: Session) -> AuthResponse {
    AuthResponse {
        user_id: session.user.id,
        username: session.user.username,
        email: session.user.email,
        profile_picture: session.user.profile_picture,
        joined_date: session.user.created_at,
        token: session.token.token,
        expires_at: session.token.expires_at,
    }
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .forum
        .accounts
        .register(&req.username, &req.email, &req.password)
        .await?;
    Ok(created(auth_response(session)))
}

/// POST /auth/login. Email takes precedence over username when both are sent.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.password.is_empty() {
        return Err(ForumError::validation("password is required").into());
    }
    let identifier = match (req.email, req.username) {
        (Some(email), _) if !email.is_empty() => LoginIdentifier::Email(email),
        (_, Some(username)) if !username.is_empty() => LoginIdentifier::Username(username),
        _ => return Err(ForumError::validation("email or username is required").into()),
    };

    let session = state.forum.accounts.login(&identifier, &req.password).await?;
    Ok(ok(auth_response(session)))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> ApiResult<impl IntoResponse> {
    state.forum.accounts.logout(&token).await?;
    Ok(ok(MessageResponse::new("logged out successfully")))
}

/// GET /auth/verify
pub async fn verify(Extension(AuthUser(user_id)): Extension<AuthUser>) -> impl IntoResponse {
    ok(VerifyResponse {
        user_id,
        valid: true,
        status: "authenticated".into(),
    })
}
