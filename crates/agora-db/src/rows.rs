//! Row mapping. Every entity is scanned through [`FromRow`], which only needs
//! something that can hand out typed column values by name.

use agora_types::models::{
    Category, Comment, ComponentType, Membership, Notification, NotificationStatus, Post,
    Reaction, ReactionTarget, ReactionType, Token, User,
};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, Type};

pub trait RowSource {
    fn value<T: FromSql>(&self, column: &str) -> rusqlite::Result<T>;
}

impl RowSource for rusqlite::Row<'_> {
    fn value<T: FromSql>(&self, column: &str) -> rusqlite::Result<T> {
        self.get(column)
    }
}

pub trait FromRow: Sized {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self>;
}

/// Adapter for `query_row`/`query_map` closures.
pub fn map_row<T: FromRow>(row: &rusqlite::Row<'_>) -> rusqlite::Result<T> {
    T::from_row(row)
}

fn conversion_error(column: &str, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("column {column}: {message}").into(),
    )
}

fn unix_seconds<R: RowSource>(row: &R, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.value(column)?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| conversion_error(column, format!("timestamp {secs} out of range")))
}

impl FromRow for User {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.value("id")?,
            username: row.value("username")?,
            email: row.value("email")?,
            password_hash: row.value("password_hash")?,
            profile_picture: row.value("profile_picture")?,
            created_at: row.value("created_at")?,
        })
    }
}

impl FromRow for Token {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        Ok(Token {
            id: row.value("id")?,
            user_id: row.value("user_id")?,
            token: row.value("token")?,
            expires_at: unix_seconds(row, "expires_at")?,
        })
    }
}

impl FromRow for Category {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        Ok(Category {
            id: row.value("id")?,
            name: row.value("name")?,
        })
    }
}

impl FromRow for Post {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        Ok(Post {
            id: row.value("id")?,
            owner_id: row.value("owner_id")?,
            category_id: row.value("category_id")?,
            headline: row.value("headline")?,
            text: row.value("text")?,
            image: row.value("image")?,
            created_at: row.value("created_at")?,
            updated_at: row.value("updated_at")?,
            edited: row.value("edited")?,
        })
    }
}

impl FromRow for Comment {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        Ok(Comment {
            id: row.value("id")?,
            post_id: row.value("post_id")?,
            owner_id: row.value("owner_id")?,
            parent_comment_id: row.value("parent_comment_id")?,
            text: row.value("text")?,
            image: row.value("image")?,
            created_at: row.value("created_at")?,
            updated_at: row.value("updated_at")?,
            edited: row.value("edited")?,
        })
    }
}

impl FromRow for ReactionType {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        Ok(ReactionType {
            id: row.value("id")?,
            name: row.value("name")?,
            image: row.value("image")?,
        })
    }
}

/// Expects `target_kind` ('post' | 'comment') and `target_id` columns, so
/// both reaction tables share one mapper.
impl FromRow for Reaction {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        let kind: String = row.value("target_kind")?;
        let target_id: i64 = row.value("target_id")?;
        let target = match kind.as_str() {
            "post" => ReactionTarget::Post(target_id),
            "comment" => ReactionTarget::Comment(target_id),
            other => {
                return Err(conversion_error(
                    "target_kind",
                    format!("unknown reaction target '{other}'"),
                ));
            }
        };
        Ok(Reaction {
            id: row.value("id")?,
            target,
            owner_id: row.value("owner_id")?,
            reaction_type_id: row.value("reaction_type_id")?,
        })
    }
}

impl FromRow for Membership {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        Ok(Membership {
            id: row.value("id")?,
            category_id: row.value("category_id")?,
            user_id: row.value("user_id")?,
            joined_date: row.value("joined_date")?,
        })
    }
}

impl FromRow for Notification {
    fn from_row<R: RowSource>(row: &R) -> rusqlite::Result<Self> {
        let component: String = row.value("component_type")?;
        let component_type = component
            .parse::<ComponentType>()
            .map_err(|e| conversion_error("component_type", e))?;
        let read: bool = row.value("is_read")?;
        Ok(Notification {
            id: row.value("id")?,
            owner_id: row.value("owner_id")?,
            actor_id: row.value("actor_id")?,
            component_type,
            component_id: row.value("component_id")?,
            notification_type: row.value("notification_type")?,
            status: NotificationStatus::from(read),
            created_at: row.value("created_at")?,
        })
    }
}
