use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::presigning::PresigningConfig;
use tracing::{debug, info};

use agora_core::UploadSigner;

/// Presigns S3 `PutObject` requests against one bucket.
pub struct S3Presigner {
    client: Client,
    bucket: String,
}

impl S3Presigner {
    /// Credentials come from the usual AWS provider chain (env, profile, IMDS).
    pub async fn connect(bucket: &str, region: &str) -> anyhow::Result<Self> {
        anyhow::ensure!(!bucket.is_empty(), "S3 bucket name is empty");
        anyhow::ensure!(!region.is_empty(), "S3 region is empty");

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_owned()))
            .load()
            .await;

        info!("S3 uploads enabled (bucket {}, region {})", bucket, region);
        Ok(Self::with_client(Client::new(&config), bucket))
    }

    pub fn with_client(client: Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_owned(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl UploadSigner for S3Presigner {
    async fn presign_upload(&self, key: &str, expiry: Duration) -> anyhow::Result<String> {
        let presigning = PresigningConfig::expires_in(expiry)
            .with_context(|| format!("invalid presign expiry {:?}", expiry))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .with_context(|| format!("presigning PutObject for {}", key))?;

        debug!("Presigned upload for s3://{}/{}", self.bucket, key);
        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::Credentials;

    fn offline_presigner() -> S3Presigner {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
            .build();
        S3Presigner::with_client(Client::from_conf(config), "agora-uploads")
    }

    #[tokio::test]
    async fn presigned_url_targets_bucket_and_key() {
        let presigner = offline_presigner();
        let url = presigner
            .presign_upload("7/avatar.png", Duration::from_secs(900))
            .await
            .unwrap();

        assert!(url.contains("agora-uploads"));
        assert!(url.contains("7/avatar.png"));
        assert!(url.contains("X-Amz-Expires=900"));
    }

    #[tokio::test]
    async fn rejects_expiry_beyond_a_week() {
        let presigner = offline_presigner();
        let err = presigner
            .presign_upload("7/a.png", Duration::from_secs(8 * 24 * 3600))
            .await;
        assert!(err.is_err());
    }
}
