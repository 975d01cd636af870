//! Forum services: authentication, ownership checks, the reaction and
//! notification ledgers, and the account/category/post/comment workflows
//! built on them. Nothing here knows about HTTP.

pub mod accounts;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod notifications;
pub mod ownership;
pub mod posts;
pub mod reactions;
pub mod uploads;
pub mod validation;

use agora_db::{Database, StoreResult};
use agora_types::{ForumError, ForumResult};

pub use accounts::{Accounts, Session};
pub use auth::{AuthConfig, Authenticator, IssuedToken, JwtSecret, LoginIdentifier};
pub use categories::Categories;
pub use comments::Comments;
pub use notifications::NotificationLedger;
pub use posts::Posts;
pub use reactions::{ReactionLedger, ReactionSummary};
pub use uploads::{PresignedUpload, UploadSigner, Uploads};

/// Every service, sharing one database handle.
#[derive(Clone)]
pub struct Forum {
    pub auth: Authenticator,
    pub accounts: Accounts,
    pub categories: Categories,
    pub posts: Posts,
    pub comments: Comments,
    pub reactions: ReactionLedger,
    pub notifications: NotificationLedger,
    pub uploads: Uploads,
}

impl Forum {
    pub fn new(db: Database, auth: AuthConfig, uploads: Uploads) -> Self {
        let authenticator = Authenticator::new(db.clone(), auth);
        Self {
            accounts: Accounts::new(db.clone(), authenticator.clone()),
            auth: authenticator,
            categories: Categories::new(db.clone()),
            posts: Posts::new(db.clone()),
            comments: Comments::new(db.clone()),
            reactions: ReactionLedger::new(db.clone()),
            notifications: NotificationLedger::new(db),
            uploads,
        }
    }
}

/// Turn an optional lookup into `NotFound` naming what was missing.
pub(crate) trait Found<T> {
    fn found(self, what: &str) -> ForumResult<T>;
}

impl<T> Found<T> for StoreResult<Option<T>> {
    fn found(self, what: &str) -> ForumResult<T> {
        match self {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(ForumError::not_found(what)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use agora_db::PoolConfig;
    use agora_types::models::{NewPost, Post, User, UserId};

    pub(crate) struct Fixture {
        pub _dir: tempfile::TempDir,
        pub forum: Forum,
        pub db: Database,
    }

    pub(crate) async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("forum.db"), PoolConfig::default())
            .await
            .unwrap();
        let forum = Forum::new(db.clone(), auth::tests::cheap_config(), Uploads::disabled());
        Fixture {
            _dir: dir,
            forum,
            db,
        }
    }

    impl Forum {
        pub(crate) async fn test_user(&self, name: &str) -> User {
            self.accounts
                .register(name, &format!("{name}@example.com"), "password1")
                .await
                .unwrap()
                .user
        }

        /// Post in the shared "general" category.
        pub(crate) async fn test_post(&self, owner: UserId, headline: &str) -> Post {
            let category = match self.categories.create("general").await {
                Ok(c) => c,
                Err(_) => self
                    .categories
                    .list()
                    .await
                    .unwrap()
                    .into_iter()
                    .find(|c| c.name == "general")
                    .unwrap(),
            };
            self.posts
                .create(
                    owner,
                    category.id,
                    NewPost {
                        headline: headline.into(),
                        text: None,
                        image: None,
                    },
                )
                .await
                .unwrap()
        }
    }

    /// End-to-end: A posts, B reacts twice, the count stays at one.
    #[tokio::test]
    async fn reaction_scenario_across_services() {
        let Fixture { _dir, forum, db } = fixture().await;
        let a = forum.test_user("alice").await;
        let b = forum.test_user("bob").await;
        let post = forum.test_post(a.id, "P").await;
        let target = agora_types::models::ReactionTarget::Post(post.id);

        forum.reactions.upsert(b.id, target, 3).await.unwrap();
        assert_eq!(forum.reactions.count(target).await.unwrap(), 1);

        forum.reactions.upsert(b.id, target, 7).await.unwrap();
        assert_eq!(forum.reactions.count(target).await.unwrap(), 1);
        let mine = forum
            .reactions
            .get_by_actor_and_target(b.id, target)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mine.reaction_type_id, 7);

        // Reactions never create notifications on their own.
        assert!(db.list_notifications(a.id, None, agora_types::models::Page::all())
            .await
            .unwrap()
            .is_empty());
    }
}
