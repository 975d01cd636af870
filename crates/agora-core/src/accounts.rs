use agora_db::{Database, StoreError};
use agora_types::models::{User, UserId};
use agora_types::{ForumError, ForumResult};
use tracing::info;

use crate::Found;
use crate::auth::{Authenticator, IssuedToken, LoginIdentifier};
use crate::validation::{require, validate_registration};

/// A signed-in user and the token that proves it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: IssuedToken,
}

#[derive(Clone)]
pub struct Accounts {
    db: Database,
    auth: Authenticator,
}

impl Accounts {
    pub fn new(db: Database, auth: Authenticator) -> Self {
        Self { db, auth }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ForumResult<Session> {
        validate_registration(username, email, password)?;

        if self.db.get_user_by_email(email).await?.is_some() {
            return Err(ForumError::conflict("email already registered"));
        }
        if self.db.get_user_by_username(username).await?.is_some() {
            return Err(ForumError::conflict("username already taken"));
        }

        let password_hash = self.auth.hash_password(password).await?;
        let user = self
            .db
            .create_user(username, email, &password_hash)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ForumError::conflict("username or email already in use"),
                other => other.into(),
            })?;

        let token = self.auth.issue(user.id).await?;
        info!("Registered user {} ({})", user.username, user.id);
        Ok(Session { user, token })
    }

    pub async fn login(
        &self,
        identifier: &LoginIdentifier,
        password: &str,
    ) -> ForumResult<Session> {
        require("password", password)?;
        let user = self.auth.check_credentials(identifier, password).await?;
        let token = self.auth.issue(user.id).await?;
        info!("User {} logged in", user.id);
        Ok(Session { user, token })
    }

    pub async fn logout(&self, token: &str) -> ForumResult<()> {
        self.auth.revoke(token).await
    }

    pub async fn get(&self, id: UserId) -> ForumResult<User> {
        self.db.get_user_by_id(id).await.found("user")
    }

    pub async fn update_username(&self, id: UserId, username: &str) -> ForumResult<User> {
        require("username", username)?;
        match self.db.update_username(id, username).await {
            Ok(user) => Ok(user),
            Err(StoreError::Conflict(_)) => Err(ForumError::conflict("username already taken")),
            Err(StoreError::NoRows) => Err(ForumError::not_found("user")),
            Err(e) => Err(e.into()),
        }
    }

    /// `None` removes the current picture.
    pub async fn set_profile_picture(
        &self,
        id: UserId,
        picture: Option<&str>,
    ) -> ForumResult<User> {
        if let Some(picture) = picture {
            require("profile_picture", picture)?;
        }
        match self
            .db
            .set_profile_picture(id, picture.map(str::to_owned))
            .await
        {
            Ok(user) => Ok(user),
            Err(StoreError::NoRows) => Err(ForumError::not_found("user")),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the account along with everything it owns.
    pub async fn delete(&self, id: UserId) -> ForumResult<()> {
        match self.db.delete_user(id).await {
            Ok(()) => {
                info!("Deleted user {}", id);
                Ok(())
            }
            Err(StoreError::NoRows) => Err(ForumError::not_found("user")),
            Err(e) => Err(e.into()),
        }
    }
}
