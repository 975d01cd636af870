use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

use agora_core::{AuthConfig, JwtSecret};
use agora_db::PoolConfig;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
}

/// Everything the binary reads from `AGORA_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: JwtSecret,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub token_ttl_hours: i64,
    pub pool: PoolConfig,
    /// Seconds between expired-token purges; zero disables the loop.
    pub token_purge_secs: u64,
    pub s3: Option<S3Config>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("AGORA_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("AGORA_JWT_SECRET is unset or still a placeholder");
        }

        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            max_open: parse_or(&var, "AGORA_DB_MAX_OPEN", defaults.max_open)?,
            min_idle: parse_or(&var, "AGORA_DB_MIN_IDLE", defaults.min_idle)?,
            max_idle_time: Duration::from_secs(parse_or(
                &var,
                "AGORA_DB_MAX_IDLE_SECS",
                defaults.max_idle_time.as_secs(),
            )?),
            max_lifetime: Duration::from_secs(parse_or(
                &var,
                "AGORA_DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime.as_secs(),
            )?),
            ..defaults
        };
        if pool.max_open == 0 {
            bail!("AGORA_DB_MAX_OPEN must be at least 1");
        }

        let token_ttl_hours: i64 = parse_or(&var, "AGORA_TOKEN_TTL_HOURS", 24)?;
        if token_ttl_hours <= 0 {
            bail!("AGORA_TOKEN_TTL_HOURS must be positive");
        }

        let s3 = var("AGORA_S3_BUCKET").map(|bucket| S3Config {
            bucket,
            region: var("AGORA_S3_REGION").unwrap_or_else(|| "us-east-1".into()),
        });

        Ok(Self {
            jwt_secret: JwtSecret::new(jwt_secret),
            db_path: var("AGORA_DB_PATH")
                .unwrap_or_else(|| "agora.db".into())
                .into(),
            host: var("AGORA_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "AGORA_PORT", 3000)?,
            token_ttl_hours,
            pool,
            token_purge_secs: parse_or(&var, "AGORA_TOKEN_PURGE_SECS", 3600)?,
            s3,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn auth(&self) -> AuthConfig {
        let mut auth = AuthConfig::new(self.jwt_secret.clone());
        auth.token_ttl = chrono::Duration::hours(self.token_ttl_hours);
        auth
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
