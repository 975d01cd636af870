use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::error;

use agora_types::models::UserId;
use agora_types::{ForumError, ForumResult};

use crate::validation::validate_file_name;

pub const PRESIGN_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Object storage that can hand out time-limited upload URLs.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    async fn presign_upload(&self, key: &str, expiry: Duration) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    pub url: String,
    pub key: String,
    pub expires_in: Duration,
}

#[derive(Clone)]
pub struct Uploads {
    signer: Option<Arc<dyn UploadSigner>>,
}

impl Uploads {
    pub fn new(signer: Arc<dyn UploadSigner>) -> Self {
        Self {
            signer: Some(signer),
        }
    }

    /// No object storage configured; every presign request fails.
    pub fn disabled() -> Self {
        Self { signer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.signer.is_some()
    }

    /// Presign a PUT for `{user_id}/{file_name}`.
    pub async fn presign(&self, user_id: UserId, file_name: &str) -> ForumResult<PresignedUpload> {
        validate_file_name(file_name)?;
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| ForumError::internal("uploads are not configured"))?;

        let key = upload_key(user_id, file_name);
        let url = signer
            .presign_upload(&key, PRESIGN_EXPIRY)
            .await
            .map_err(|e| {
                error!("Presigning {} failed: {:#}", key, e);
                ForumError::internal("failed to generate upload URL")
            })?;

        Ok(PresignedUpload {
            url,
            key,
            expires_in: PRESIGN_EXPIRY,
        })
    }
}

pub fn upload_key(user_id: UserId, file_name: &str) -> String {
    format!("{user_id}/{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::ErrorKind;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSigner {
        seen: Mutex<Vec<(String, Duration)>>,
    }

    #[async_trait]
    impl UploadSigner for RecordingSigner {
        async fn presign_upload(&self, key: &str, expiry: Duration) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push((key.to_string(), expiry));
            Ok(format!("https://bucket.example/{key}?sig=abc"))
        }
    }

    struct FailingSigner;

    #[async_trait]
    impl UploadSigner for FailingSigner {
        async fn presign_upload(&self, _key: &str, _expiry: Duration) -> anyhow::Result<String> {
            anyhow::bail!("credentials expired")
        }
    }

    #[tokio::test]
    async fn keys_are_scoped_to_the_user() {
        let signer = Arc::new(RecordingSigner::default());
        let uploads = Uploads::new(signer.clone());

        let presigned = uploads.presign(42, "avatar.png").await.unwrap();
        assert_eq!(presigned.key, "42/avatar.png");
        assert_eq!(presigned.expires_in, PRESIGN_EXPIRY);
        assert!(presigned.url.contains("42/avatar.png"));
        assert_eq!(
            signer.seen.lock().unwrap().as_slice(),
            &[("42/avatar.png".to_string(), Duration::from_secs(900))]
        );
    }

    #[tokio::test]
    async fn failures_surface_as_internal_or_validation() {
        let uploads = Uploads::new(Arc::new(FailingSigner));
        let err = uploads.presign(1, "a.png").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        let err = uploads.presign(1, "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = Uploads::disabled().presign(1, "a.png").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
