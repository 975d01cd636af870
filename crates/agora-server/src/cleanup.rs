use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use agora_core::Authenticator;

/// Background task that deletes tokens past their `expires_at`.
///
/// Failures are logged and the loop keeps going; the next tick retries.
pub async fn run_token_purge_loop(auth: Authenticator, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        match auth.purge_expired(Utc::now()).await {
            Ok(count) => {
                if count > 0 {
                    info!("Cleanup: purged {} expired tokens", count);
                }
            }
            Err(e) => {
                warn!("Token purge error: {}", e);
            }
        }
    }
}
