use rusqlite::Connection;
use tracing::info;

use crate::error::StoreResult;

pub const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial forum schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                profile_picture TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE tokens (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token       TEXT NOT NULL UNIQUE,
                expires_at  INTEGER NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_tokens_expires ON tokens(expires_at);

            CREATE TABLE categories (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                name    TEXT NOT NULL UNIQUE
            );

            CREATE TABLE posts (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                headline    TEXT NOT NULL,
                text        TEXT,
                image       TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                edited      INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_posts_category ON posts(category_id, id);
            CREATE INDEX idx_posts_owner ON posts(owner_id, id);

            CREATE TABLE comments (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id             INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                owner_id            INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                parent_comment_id   INTEGER REFERENCES comments(id) ON DELETE CASCADE,
                text                TEXT NOT NULL,
                image               TEXT,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL,
                edited              INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_comments_post ON comments(post_id, id);
            CREATE INDEX idx_comments_parent ON comments(parent_comment_id, id);
            CREATE INDEX idx_comments_owner ON comments(owner_id, id);

            CREATE TABLE reaction_types (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                name    TEXT NOT NULL UNIQUE,
                image   TEXT
            );

            CREATE TABLE reactions (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id             INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                owner_id            INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                reaction_type_id    INTEGER NOT NULL REFERENCES reaction_types(id),
                UNIQUE(post_id, owner_id)
            );

            CREATE TABLE comment_reactions (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                comment_id          INTEGER NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
                owner_id            INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                reaction_type_id    INTEGER NOT NULL REFERENCES reaction_types(id),
                UNIQUE(comment_id, owner_id)
            );

            CREATE TABLE memberships (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                joined_date TEXT NOT NULL,
                UNIQUE(category_id, user_id)
            );

            CREATE TABLE notifications (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id            INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                actor_id            INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                component_type      TEXT NOT NULL CHECK (component_type IN ('post', 'comment')),
                component_id        INTEGER NOT NULL,
                notification_type   TEXT NOT NULL,
                is_read             INTEGER NOT NULL DEFAULT 0,
                created_at          TEXT NOT NULL
            );

            CREATE INDEX idx_notifications_owner ON notifications(owner_id, is_read, id);

            -- Default reaction palette
            INSERT OR IGNORE INTO reaction_types (name) VALUES
                ('like'), ('love'), ('haha'), ('wow'), ('sad'), ('angry'), ('care');

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete (schema v{})", SCHEMA_VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent_and_seed_reaction_types() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        let types: i64 = conn
            .query_row("SELECT COUNT(*) FROM reaction_types", [], |r| r.get(0))
            .unwrap();
        assert_eq!(types, 7);
    }
}
