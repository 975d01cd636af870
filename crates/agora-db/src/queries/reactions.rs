use agora_types::models::{Reaction, ReactionTarget, ReactionType, ReactionTypeId, UserId};
use rusqlite::params;

use super::OptionalExt;
use crate::Database;
use crate::error::StoreResult;
use crate::rows::map_row;

/// Table, target column and kind tag for a reaction target.
fn target_table(target: &ReactionTarget) -> (&'static str, &'static str, &'static str) {
    match target {
        ReactionTarget::Post(_) => ("reactions", "post_id", "post"),
        ReactionTarget::Comment(_) => ("comment_reactions", "comment_id", "comment"),
    }
}

impl Database {
    /// Insert-or-replace the actor's reaction on `target` in one statement.
    /// An existing row keeps its id and only its reaction type changes.
    pub async fn upsert_reaction(
        &self,
        target: ReactionTarget,
        owner_id: UserId,
        reaction_type_id: ReactionTypeId,
    ) -> StoreResult<Reaction> {
        self.call(move |conn| {
            let (table, column, kind) = target_table(&target);
            let sql = format!(
                "INSERT INTO {table} ({column}, owner_id, reaction_type_id)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT ({column}, owner_id)
                    DO UPDATE SET reaction_type_id = excluded.reaction_type_id
                 RETURNING id, '{kind}' AS target_kind, {column} AS target_id,
                           owner_id, reaction_type_id"
            );
            Ok(conn.query_row(
                &sql,
                params![target.id(), owner_id, reaction_type_id],
                map_row,
            )?)
        })
        .await
    }

    /// Number of reactions on `target`, whatever their type.
    pub async fn count_reactions(&self, target: ReactionTarget) -> StoreResult<i64> {
        self.call(move |conn| {
            let (table, column, _) = target_table(&target);
            let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1");
            Ok(conn.query_row(&sql, [target.id()], |r| r.get(0))?)
        })
        .await
    }

    pub async fn get_reaction(
        &self,
        target: ReactionTarget,
        owner_id: UserId,
    ) -> StoreResult<Option<Reaction>> {
        self.call(move |conn| {
            let (table, column, kind) = target_table(&target);
            let sql = format!(
                "SELECT id, '{kind}' AS target_kind, {column} AS target_id,
                        owner_id, reaction_type_id
                 FROM {table} WHERE {column} = ?1 AND owner_id = ?2"
            );
            conn.query_row(&sql, [target.id(), owner_id], map_row)
                .optional()
        })
        .await
    }

    pub async fn list_reaction_types(&self) -> StoreResult<Vec<ReactionType>> {
        self.call(|conn| {
            let mut stmt =
                conn.prepare_cached("SELECT id, name, image FROM reaction_types ORDER BY id")?;
            let rows = stmt
                .query_map([], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn get_reaction_type(&self, id: ReactionTypeId) -> StoreResult<Option<ReactionType>> {
        self.call(move |conn| {
            conn.query_row(
                "SELECT id, name, image FROM reaction_types WHERE id = ?1",
                [id],
                map_row,
            )
            .optional()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use agora_types::models::{NewComment, NewPost, ReactionTarget};

    use crate::test_support::open_temp;
    use crate::{Database, StoreError};

    async fn seed_post(db: &Database) -> (i64, i64) {
        let user = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        let cat = db.create_category("rust").await.unwrap();
        let post = db
            .create_post(
                user.id,
                cat.id,
                NewPost {
                    headline: "hello".into(),
                    text: None,
                    image: None,
                },
            )
            .await
            .unwrap();
        (user.id, post.id)
    }

    #[tokio::test]
    async fn second_reaction_replaces_type_and_keeps_id() {
        let (_dir, db) = open_temp().await;
        let (user, post) = seed_post(&db).await;
        let target = ReactionTarget::Post(post);

        let first = db.upsert_reaction(target, user, 1).await.unwrap();
        let second = db.upsert_reaction(target, user, 2).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.reaction_type_id, 2);
        assert_eq!(second.target, target);
        assert_eq!(db.count_reactions(target).await.unwrap(), 1);

        let again = db.upsert_reaction(target, user, 2).await.unwrap();
        assert_eq!(again, second);
    }

    #[tokio::test]
    async fn post_and_comment_reactions_are_independent() {
        let (_dir, db) = open_temp().await;
        let (user, post) = seed_post(&db).await;
        let comment = db
            .create_comment(
                post,
                user,
                NewComment {
                    text: "hi".into(),
                    image: None,
                },
            )
            .await
            .unwrap();

        db.upsert_reaction(ReactionTarget::Post(post), user, 1).await.unwrap();
        db.upsert_reaction(ReactionTarget::Comment(comment.id), user, 3)
            .await
            .unwrap();

        let on_comment = db
            .get_reaction(ReactionTarget::Comment(comment.id), user)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(on_comment.reaction_type_id, 3);
        assert_eq!(db.count_reactions(ReactionTarget::Post(post)).await.unwrap(), 1);
        assert!(db
            .get_reaction(ReactionTarget::Post(post), user + 1)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn invalid_references_are_rejected() {
        let (_dir, db) = open_temp().await;
        let (user, post) = seed_post(&db).await;

        assert!(matches!(
            db.upsert_reaction(ReactionTarget::Post(post), user, 999).await,
            Err(StoreError::InvalidReference)
        ));
        assert!(matches!(
            db.upsert_reaction(ReactionTarget::Post(post + 100), user, 1).await,
            Err(StoreError::InvalidReference)
        ));
    }

    #[tokio::test]
    async fn seeded_reaction_types() {
        let (_dir, db) = open_temp().await;
        let types = db.list_reaction_types().await.unwrap();
        assert_eq!(types.len(), 7);
        assert_eq!(types[0].name, "like");
        assert!(db.get_reaction_type(99).await.unwrap().is_none());
    }
}
