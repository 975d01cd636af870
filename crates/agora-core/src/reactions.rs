use agora_db::{Database, StoreError};
use agora_types::models::{Reaction, ReactionTarget, ReactionType, ReactionTypeId, UserId};
use agora_types::{ForumError, ForumResult};
use tracing::debug;

use crate::Found;

/// Reaction count on a target plus the caller's own reaction, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionSummary {
    pub total: i64,
    pub mine: Option<ReactionType>,
}

/// At most one reaction per (actor, target); reacting again swaps the type.
#[derive(Clone)]
pub struct ReactionLedger {
    db: Database,
}

impl ReactionLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn upsert(
        &self,
        actor_id: UserId,
        target: ReactionTarget,
        reaction_type_id: ReactionTypeId,
    ) -> ForumResult<Reaction> {
        if reaction_type_id <= 0 {
            return Err(ForumError::validation("reaction_type_id is required"));
        }
        self.ensure_target(target).await?;
        self.get_type(reaction_type_id).await?;

        let reaction = self
            .db
            .upsert_reaction(target, actor_id, reaction_type_id)
            .await
            .map_err(|e| match e {
                // Target or type vanished between the checks and the write.
                StoreError::InvalidReference => ForumError::not_found("reaction target or type"),
                other => other.into(),
            })?;

        debug!(
            "User {} reacted {} on {:?}",
            actor_id, reaction_type_id, target
        );
        Ok(reaction)
    }

    pub async fn count(&self, target: ReactionTarget) -> ForumResult<i64> {
        Ok(self.db.count_reactions(target).await?)
    }

    /// Absence is a normal answer, not an error.
    pub async fn get_by_actor_and_target(
        &self,
        actor_id: UserId,
        target: ReactionTarget,
    ) -> ForumResult<Option<Reaction>> {
        Ok(self.db.get_reaction(target, actor_id).await?)
    }

    pub async fn summary(
        &self,
        actor_id: UserId,
        target: ReactionTarget,
    ) -> ForumResult<ReactionSummary> {
        let total = self.count(target).await?;
        let mine = match self.get_by_actor_and_target(actor_id, target).await? {
            Some(reaction) => self.db.get_reaction_type(reaction.reaction_type_id).await?,
            None => None,
        };
        Ok(ReactionSummary { total, mine })
    }

    pub async fn list_types(&self) -> ForumResult<Vec<ReactionType>> {
        Ok(self.db.list_reaction_types().await?)
    }

    pub async fn get_type(&self, id: ReactionTypeId) -> ForumResult<ReactionType> {
        self.db.get_reaction_type(id).await.found("reaction type")
    }

    async fn ensure_target(&self, target: ReactionTarget) -> ForumResult<()> {
        match target {
            ReactionTarget::Post(id) => self.db.get_post(id).await.found("post").map(|_| ()),
            ReactionTarget::Comment(id) => {
                self.db.get_comment(id).await.found("comment").map(|_| ())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, fixture};
    use agora_types::ErrorKind;

    #[tokio::test]
    async fn changing_reaction_keeps_one_row() {
        let Fixture { _dir, forum, .. } = fixture().await;
        let a = forum.test_user("alice").await;
        let b = forum.test_user("bob").await;
        let post = forum.test_post(a.id, "hello").await;
        let target = ReactionTarget::Post(post.id);

        let first = forum.reactions.upsert(b.id, target, 3).await.unwrap();
        assert_eq!(forum.reactions.count(target).await.unwrap(), 1);

        let second = forum.reactions.upsert(b.id, target, 7).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(forum.reactions.count(target).await.unwrap(), 1);

        let mine = forum
            .reactions
            .get_by_actor_and_target(b.id, target)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mine.reaction_type_id, 7);

        let summary = forum.reactions.summary(b.id, target).await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.mine.map(|t| t.name).as_deref(), Some("care"));

        let other = forum.reactions.summary(a.id, target).await.unwrap();
        assert!(other.mine.is_none());
    }

    #[tokio::test]
    async fn bad_targets_and_types() {
        let Fixture { _dir, forum, .. } = fixture().await;
        let a = forum.test_user("alice").await;
        let post = forum.test_post(a.id, "hello").await;

        let missing_post = forum
            .reactions
            .upsert(a.id, ReactionTarget::Post(post.id + 1), 1)
            .await
            .unwrap_err();
        assert_eq!(missing_post.message(), "post not found");

        let missing_comment = forum
            .reactions
            .upsert(a.id, ReactionTarget::Comment(55), 1)
            .await
            .unwrap_err();
        assert_eq!(missing_comment.message(), "comment not found");

        let missing_type = forum
            .reactions
            .upsert(a.id, ReactionTarget::Post(post.id), 42)
            .await
            .unwrap_err();
        assert_eq!(missing_type.kind(), ErrorKind::NotFound);

        let zero = forum
            .reactions
            .upsert(a.id, ReactionTarget::Post(post.id), 0)
            .await
            .unwrap_err();
        assert_eq!(zero.kind(), ErrorKind::Validation);
    }
}
