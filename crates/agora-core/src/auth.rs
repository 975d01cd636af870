use std::fmt;
use std::sync::{Arc, OnceLock};

use argon2::password_hash::SaltString;
use argon2::{Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use tracing::{error, info, warn};

use agora_db::Database;
use agora_types::api::Claims;
use agora_types::models::{User, UserId};
use agora_types::{ForumError, ForumResult};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// HMAC signing secret. Debug output never shows the value.
#[derive(Clone)]
pub struct JwtSecret(Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: JwtSecret,
    pub token_ttl: Duration,
    pub hashing: Params,
}

impl AuthConfig {
    pub fn new(secret: JwtSecret) -> Self {
        Self {
            secret,
            token_ttl: Duration::hours(24),
            hashing: Params::default(),
        }
    }
}

/// How a user names themselves at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Username(String),
}

/// A freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

struct Inner {
    db: Database,
    ttl: Duration,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    hasher: Argon2<'static>,
    dummy_hash: OnceLock<String>,
}

/// Issues, validates and revokes bearer tokens, and checks passwords.
///
/// A token is accepted only while its signed `exp` claim is in the future
/// *and* its row is still present and unexpired in the token store, so
/// revocation takes effect immediately.
#[derive(Clone)]
pub struct Authenticator {
    inner: Arc<Inner>,
}

impl Authenticator {
    pub fn new(db: Database, config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let hasher = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, config.hashing);

        Self {
            inner: Arc::new(Inner {
                db,
                ttl: config.token_ttl,
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret.as_bytes()),
                validation,
                hasher,
                dummy_hash: OnceLock::new(),
            }),
        }
    }

    /// Sign a token for `user_id` and record it in the token store.
    pub async fn issue(&self, user_id: UserId) -> ForumResult<IssuedToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.inner.ttl).timestamp(),
            jti: hex::encode(rand::random::<[u8; 16]>()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding)
            .map_err(|e| {
                error!("Failed to sign token for user {}: {}", user_id, e);
                ForumError::internal("failed to issue token")
            })?;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| ForumError::internal("token expiry out of range"))?;

        self.inner
            .db
            .insert_token(user_id, &token, expires_at)
            .await?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Resolve a bearer token to the user it was issued to.
    pub async fn validate(&self, token: &str) -> ForumResult<UserId> {
        if token.is_empty() {
            return Err(ForumError::unauthenticated("missing token"));
        }

        let data = decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
            .map_err(|e| {
                warn!("Rejected bearer token: {}", e);
                ForumError::unauthenticated("invalid or expired token")
            })?;

        let user_id = data
            .claims
            .sub
            .parse::<UserId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ForumError::unauthenticated("invalid token subject"))?;

        let stored = self
            .inner
            .db
            .get_token(token)
            .await?
            .ok_or_else(|| ForumError::unauthenticated("token revoked or unknown"))?;

        if !stored.is_live_at(Utc::now()) {
            return Err(ForumError::unauthenticated("token expired"));
        }
        if stored.user_id != user_id {
            warn!("Token subject {} does not match stored owner {}", user_id, stored.user_id);
            return Err(ForumError::unauthenticated("invalid token subject"));
        }

        Ok(user_id)
    }

    /// Delete the stored token. Revoking an unknown or already revoked token
    /// is `Unauthenticated`.
    pub async fn revoke(&self, token: &str) -> ForumResult<()> {
        let stored = self
            .inner
            .db
            .get_token(token)
            .await?
            .ok_or_else(|| ForumError::unauthenticated("token not found"))?;

        match self.inner.db.delete_token(&stored.token).await {
            Ok(()) => {
                info!("Revoked token for user {}", stored.user_id);
                Ok(())
            }
            Err(agora_db::StoreError::NoRows) => {
                Err(ForumError::unauthenticated("token not found"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up the user and verify the password. An unknown identifier and a
    /// wrong password fail identically, and both pay for one hash verification.
    pub async fn check_credentials(
        &self,
        identifier: &LoginIdentifier,
        password: &str,
    ) -> ForumResult<User> {
        let db = &self.inner.db;
        let user = match identifier {
            LoginIdentifier::Email(email) => db.get_user_by_email(email).await?,
            LoginIdentifier::Username(name) => db.get_user_by_username(name).await?,
        };

        let inner = Arc::clone(&self.inner);
        let password = password.to_owned();
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => verify_with(&inner.hasher, &password, &hash),
            None => {
                if let Some(dummy) = dummy_hash(&inner) {
                    let _ = verify_with(&inner.hasher, &password, &dummy);
                }
                false
            }
        })
        .await
        .map_err(|e| {
            error!("Password verification task failed: {}", e);
            ForumError::internal("failed to verify credentials")
        })?;

        match user {
            Some(user) if verified => Ok(user),
            _ => {
                warn!("Failed login attempt");
                Err(ForumError::unauthenticated(INVALID_CREDENTIALS))
            }
        }
    }

    /// Argon2id PHC string for `password`, computed off the async runtime.
    pub async fn hash_password(&self, password: &str) -> ForumResult<String> {
        let inner = Arc::clone(&self.inner);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_with(&inner.hasher, &password))
            .await
            .map_err(|e| {
                error!("Password hashing task failed: {}", e);
                ForumError::internal("failed to hash password")
            })?
    }

    /// Remove tokens that expired before `cutoff`.
    pub async fn purge_expired(&self, cutoff: DateTime<Utc>) -> ForumResult<usize> {
        Ok(self.inner.db.purge_expired_tokens(cutoff).await?)
    }
}

fn hash_with(hasher: &Argon2<'static>, password: &str) -> ForumResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ForumError::internal("failed to hash password")
        })
}

fn verify_with(hasher: &Argon2<'static>, password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => hasher.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

fn dummy_hash(inner: &Inner) -> Option<String> {
    if let Some(hash) = inner.dummy_hash.get() {
        return Some(hash.clone());
    }
    let hash = hash_with(&inner.hasher, "agora-timing-equaliser").ok()?;
    Some(inner.dummy_hash.get_or_init(|| hash).clone())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use agora_db::PoolConfig;
    use agora_types::ErrorKind;

    pub(crate) const SECRET: &str = "test-secret-do-not-use";

    pub(crate) fn cheap_config() -> AuthConfig {
        AuthConfig {
            hashing: Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
                .unwrap(),
            ..AuthConfig::new(JwtSecret::new(SECRET))
        }
    }

    async fn setup() -> (tempfile::TempDir, Database, Authenticator) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("auth.db"), PoolConfig::default())
            .await
            .unwrap();
        let auth = Authenticator::new(db.clone(), cheap_config());
        (dir, db, auth)
    }

    async fn user(db: &Database, auth: &Authenticator, name: &str) -> User {
        let hash = auth.hash_password("correct horse").await.unwrap();
        db.create_user(name, &format!("{name}@example.com"), &hash)
            .await
            .unwrap()
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn issued_token_validates_to_its_user() {
        let (_dir, db, auth) = setup().await;
        let alice = user(&db, &auth, "alice").await;

        let issued = auth.issue(alice.id).await.unwrap();
        assert!(issued.expires_at > Utc::now() + Duration::hours(23));
        assert_eq!(auth.validate(&issued.token).await.unwrap(), alice.id);
    }

    #[tokio::test]
    async fn revoked_token_is_rejected_despite_valid_signature() {
        let (_dir, db, auth) = setup().await;
        let alice = user(&db, &auth, "alice").await;
        let issued = auth.issue(alice.id).await.unwrap();

        auth.revoke(&issued.token).await.unwrap();

        // Signature and exp are still fine on their own.
        let inner = &auth.inner;
        assert!(decode::<Claims>(&issued.token, &inner.decoding, &inner.validation).is_ok());
        let err = auth.validate(&issued.token).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);

        let again = auth.revoke(&issued.token).await.unwrap_err();
        assert_eq!(again.kind(), ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn expired_claim_is_rejected_even_with_live_row() {
        let (_dir, db, auth) = setup().await;
        let alice = user(&db, &auth, "alice").await;
        let now = Utc::now();
        let token = sign(
            &Claims {
                sub: alice.id.to_string(),
                iat: (now - Duration::hours(2)).timestamp(),
                exp: (now - Duration::hours(1)).timestamp(),
                jti: "stale".into(),
            },
            SECRET,
        );
        db.insert_token(alice.id, &token, now + Duration::hours(1))
            .await
            .unwrap();

        let err = auth.validate(&token).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn expired_row_is_rejected_even_with_valid_claim() {
        let (_dir, db, auth) = setup().await;
        let alice = user(&db, &auth, "alice").await;
        let now = Utc::now();
        let token = sign(
            &Claims {
                sub: alice.id.to_string(),
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
                jti: "row-expired".into(),
            },
            SECRET,
        );
        db.insert_token(alice.id, &token, now - Duration::seconds(1))
            .await
            .unwrap();

        assert!(auth.validate(&token).await.is_err());
    }

    #[tokio::test]
    async fn malformed_and_foreign_tokens_are_rejected() {
        let (_dir, db, auth) = setup().await;
        let alice = user(&db, &auth, "alice").await;
        let now = Utc::now();

        for bad in ["", "not-a-jwt", "a.b.c"] {
            let err = auth.validate(bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        }

        let claims = Claims {
            sub: alice.id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            jti: "x".into(),
        };
        let forged = sign(&claims, "some-other-secret");
        db.insert_token(alice.id, &forged, now + Duration::hours(1))
            .await
            .unwrap();
        assert!(auth.validate(&forged).await.is_err());

        let zero_subject = sign(
            &Claims {
                sub: "0".into(),
                ..claims.clone()
            },
            SECRET,
        );
        assert!(auth.validate(&zero_subject).await.is_err());
    }

    fn live_claims(user_id: UserId, jti: &str) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            jti: jti.into(),
        }
    }

    #[tokio::test]
    async fn non_hmac_algorithms_are_rejected_with_live_row() {
        let (_dir, db, auth) = setup().await;
        let alice = user(&db, &auth, "alice").await;
        let genuine = sign(&live_claims(alice.id, "swap"), SECRET);
        let parts: Vec<&str> = genuine.split('.').collect();

        // {"alg":"none","typ":"JWT"} with no signature, and {"alg":"RS256","typ":"JWT"}
        // reusing the HMAC signature.
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", parts[1]);
        let rs256 = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}.{}", parts[1], parts[2]);

        for token in [unsigned, rs256] {
            db.insert_token(alice.id, &token, Utc::now() + Duration::hours(1))
                .await
                .unwrap();
            let err = auth.validate(&token).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthenticated, "{token}");
        }
    }

    #[tokio::test]
    async fn other_hmac_variants_are_accepted() {
        let (_dir, db, auth) = setup().await;
        let alice = user(&db, &auth, "alice").await;

        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token = encode(
                &Header::new(alg),
                &live_claims(alice.id, &format!("{alg:?}")),
                &EncodingKey::from_secret(SECRET.as_bytes()),
            )
            .unwrap();
            db.insert_token(alice.id, &token, Utc::now() + Duration::hours(1))
                .await
                .unwrap();
            assert_eq!(auth.validate(&token).await.unwrap(), alice.id);
        }
    }

    #[tokio::test]
    async fn credential_failures_are_indistinguishable() {
        let (_dir, db, auth) = setup().await;
        user(&db, &auth, "alice").await;

        let ok = auth
            .check_credentials(
                &LoginIdentifier::Email("alice@example.com".into()),
                "correct horse",
            )
            .await
            .unwrap();
        assert_eq!(ok.username, "alice");

        let wrong_password = auth
            .check_credentials(&LoginIdentifier::Username("alice".into()), "wrong horse")
            .await
            .unwrap_err();
        let no_user = auth
            .check_credentials(&LoginIdentifier::Username("mallory".into()), "correct horse")
            .await
            .unwrap_err();
        assert_eq!(wrong_password, no_user);
        assert_eq!(no_user.message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn purge_drops_expired_rows() {
        let (_dir, db, auth) = setup().await;
        let alice = user(&db, &auth, "alice").await;
        let issued = auth.issue(alice.id).await.unwrap();

        assert_eq!(auth.purge_expired(Utc::now()).await.unwrap(), 0);
        assert_eq!(
            auth.purge_expired(issued.expires_at + Duration::seconds(1))
                .await
                .unwrap(),
            1
        );
        assert!(auth.validate(&issued.token).await.is_err());
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let rendered = format!("{:?}", cheap_config());
        assert!(!rendered.contains(SECRET));
    }
}
