pub mod error;
pub mod migrations;
pub mod queries;
pub mod rows;

use std::path::Path;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::info;

pub use error::{StoreError, StoreResult};

pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// Connection pool limits.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Upper bound on connections checked out or idle at once.
    pub max_open: u32,
    /// Idle connections kept warm. Idle connections beyond this close after
    /// `max_idle_time`.
    pub min_idle: u32,
    pub max_idle_time: Duration,
    /// Connections are closed once they have existed this long.
    pub max_lifetime: Duration,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_open: 20,
            min_idle: 2,
            max_idle_time: Duration::from_secs(5 * 60),
            max_lifetime: Duration::from_secs(60 * 60),
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

fn build_pool(path: &Path, config: &PoolConfig) -> StoreResult<SqlitePool> {
    let busy_timeout = config.busy_timeout;
    let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")
    });

    let max_open = config.max_open.max(1);
    let pool = r2d2::Pool::builder()
        .max_size(max_open)
        .min_idle(Some(config.min_idle.min(max_open)))
        .idle_timeout(Some(config.max_idle_time))
        .max_lifetime(Some(config.max_lifetime))
        .connection_timeout(config.acquire_timeout)
        .build(manager)?;
    Ok(pool)
}

/// Handle to the forum database. Cheap to clone; all clones share one pool.
///
/// Every query is an `async fn` that runs on the blocking thread pool. Dropping
/// the returned future (or wrapping it in a timeout) abandons the wait, but a
/// statement that already started still runs to completion and its effects
/// are kept.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn open(path: &Path, config: PoolConfig) -> StoreResult<Self> {
        let db_path = path.to_path_buf();
        let pool = tokio::task::spawn_blocking(move || -> StoreResult<SqlitePool> {
            let pool = build_pool(&db_path, &config)?;
            let conn = pool.get()?;
            migrations::run(&conn)?;
            Ok(pool)
        })
        .await??;

        info!(
            "Database opened at {} (max {} connections)",
            path.display(),
            pool.max_size()
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run `f` against a pooled connection on the blocking thread pool.
    pub async fn call<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn single_connection() -> PoolConfig {
        PoolConfig {
            max_open: 1,
            min_idle: 1,
            acquire_timeout: Duration::from_millis(200),
            ..PoolConfig::default()
        }
    }

    #[tokio::test]
    async fn connections_enforce_foreign_keys_and_wal() {
        let (_dir, db) = test_support::open_temp().await;
        let (fk, mode): (i64, String) = db
            .call(|conn| {
                let fk = conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0))?;
                let mode = conn.query_row("PRAGMA journal_mode", [], |r| r.get(0))?;
                Ok((fk, mode))
            })
            .await
            .unwrap();
        assert_eq!(fk, 1);
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn call_runs_on_pooled_connection() {
        let (_dir, db) = test_support::open_temp().await;
        let n: i64 = db
            .call(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM reaction_types", [], |r| r.get(0))?)
            })
            .await
            .unwrap();
        assert_eq!(n, 7);
        assert!(db.pool().state().connections >= 1);
        assert!(db.pool().state().connections <= 20);
    }

    #[tokio::test]
    async fn dropped_calls_release_their_slot() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("forum.db"), single_connection())
            .await
            .unwrap();

        let slow = db.call(|_| {
            std::thread::sleep(Duration::from_millis(50));
            Ok(())
        });
        let _ = tokio::time::timeout(Duration::from_millis(1), slow).await;

        // The abandoned call finishes in the background and frees the only slot.
        let n: i64 = db
            .call(|conn| Ok(conn.query_row("SELECT 1", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn exhausted_pool_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("forum.db"), single_connection())
            .await
            .unwrap();

        let holder = db.clone();
        let held = tokio::spawn(async move {
            holder
                .call(|_| {
                    std::thread::sleep(Duration::from_millis(600));
                    Ok(())
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = db.call(|_| Ok(())).await.unwrap_err();
        assert!(matches!(err, StoreError::Pool(_)), "{err:?}");
        held.await.unwrap().unwrap();
    }
}
