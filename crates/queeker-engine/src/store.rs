//! Async store gateways over the shared SQLite connection.
//!
//! Each call takes the connection lock for exactly one query function from
//! `queeker_db::queries`, so every store operation is atomic with respect to
//! every other.

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use queeker_db::queries::{likes, posts, users};
use queeker_db::DbError;
use queeker_types::{Actor, ActorId, FeedItem, PostId, PostsQuery};

use crate::Result;

/// The single database connection, shared by all stores and the daemon.
pub type Database = Arc<Mutex<Connection>>;

/// Owner of posts.
#[derive(Clone)]
pub struct PostStore {
    db: Database,
}

impl PostStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a post or reply and return its feed view.
    ///
    /// Aggregates are zero and `viewer_liked` false; nothing is re-read.
    pub async fn create(
        &self,
        author: &Actor,
        content: &str,
        reply_to_post_id: Option<PostId>,
        created_at: u64,
    ) -> Result<FeedItem> {
        let conn = self.db.lock().await;
        let post = posts::insert(&conn, author.id, content, reply_to_post_id, created_at)?;
        Ok(FeedItem::fresh(post, author.clone()))
    }

    pub async fn get_by_id(&self, id: PostId, viewer: Option<ActorId>) -> Result<Option<FeedItem>> {
        let conn = self.db.lock().await;
        Ok(posts::get_feed_item(&conn, id, viewer)?)
    }

    pub async fn get_many(
        &self,
        query: &PostsQuery,
        viewer: Option<ActorId>,
    ) -> Result<Vec<FeedItem>> {
        let conn = self.db.lock().await;
        Ok(posts::list(&conn, query, viewer)?)
    }

    pub async fn count(&self) -> Result<u64> {
        let conn = self.db.lock().await;
        Ok(posts::count(&conn)?)
    }
}

/// Owner of likes. Add and remove are idempotent.
#[derive(Clone)]
pub struct LikeStore {
    db: Database,
}

impl LikeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn exists(&self, actor: ActorId, post: PostId) -> Result<bool> {
        let conn = self.db.lock().await;
        Ok(likes::exists(&conn, actor, post)?)
    }

    /// Returns whether a row was inserted.
    pub async fn add(&self, actor: ActorId, post: PostId, created_at: u64) -> Result<bool> {
        let conn = self.db.lock().await;
        Ok(likes::add(&conn, actor, post, created_at)?)
    }

    /// Returns whether a row was deleted.
    pub async fn remove(&self, actor: ActorId, post: PostId) -> Result<bool> {
        let conn = self.db.lock().await;
        Ok(likes::remove(&conn, actor, post)?)
    }

    pub async fn count(&self, post: PostId) -> Result<u64> {
        let conn = self.db.lock().await;
        Ok(likes::count_for_post(&conn, post)?)
    }
}

/// Owner of actors.
#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn exists(&self, id: ActorId) -> Result<bool> {
        let conn = self.db.lock().await;
        Ok(users::exists(&conn, id)?)
    }

    pub async fn get(&self, id: ActorId) -> Result<Actor> {
        let conn = self.db.lock().await;
        Ok(users::get(&conn, id)?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Actor> {
        let conn = self.db.lock().await;
        Ok(users::get_by_username(&conn, username)?)
    }

    /// Look up `username`, creating the actor on first sight.
    ///
    /// Lookup and insert happen under one lock, so concurrent sign-ins for
    /// the same handle resolve to the same actor.
    pub async fn get_or_create(
        &self,
        username: &str,
        display_name: Option<&str>,
        avatar_url: &str,
        created_at: u64,
    ) -> Result<Actor> {
        let conn = self.db.lock().await;
        match users::get_by_username(&conn, username) {
            Ok(actor) => Ok(actor),
            Err(DbError::NotFound(_)) => {
                let id = users::insert(&conn, username, display_name, avatar_url, created_at)?;
                Ok(users::get(&conn, id)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    async fn stores() -> (PostStore, LikeStore, UserStore) {
        let db = crate::shared(queeker_db::open_memory().expect("db"));
        (
            PostStore::new(db.clone()),
            LikeStore::new(db.clone()),
            UserStore::new(db),
        )
    }

    #[tokio::test]
    async fn test_create_returns_fresh_item() {
        let (posts, likes, users) = stores().await;
        let alice = users
            .get_or_create("alice", Some("Alice"), "https://a/1.png", 100)
            .await
            .expect("user");

        let item = posts.create(&alice, "hello", None, 200).await.expect("post");
        assert_eq!(item.author, alice);
        assert_eq!(item.like_count, 0);
        assert_eq!(item.reply_count, 0);
        assert!(!item.viewer_liked);

        assert!(likes.add(alice.id, item.id(), 300).await.expect("like"));
        assert!(!likes.add(alice.id, item.id(), 301).await.expect("like again"));
        assert_eq!(likes.count(item.id()).await.expect("count"), 1);

        let seen = posts
            .get_by_id(item.id(), Some(alice.id))
            .await
            .expect("get")
            .expect("present");
        assert!(seen.viewer_liked);
        assert_eq!(seen.like_count, 1);
    }

    #[tokio::test]
    async fn test_reply_to_missing_post() {
        let (posts, _, users) = stores().await;
        let alice = users
            .get_or_create("alice", None, "https://a/1.png", 100)
            .await
            .expect("user");
        let err = posts
            .create(&alice, "orphan", Some(404), 200)
            .await
            .expect_err("missing parent");
        assert!(matches!(err, EngineError::NotFound(_)));
        assert_eq!(posts.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let (_, _, users) = stores().await;
        let first = users
            .get_or_create("bob", Some("Bob"), "https://a/2.png", 100)
            .await
            .expect("create");
        let again = users
            .get_or_create("bob", Some("Robert"), "https://a/3.png", 200)
            .await
            .expect("get");
        assert_eq!(first, again);
        assert!(users.exists(first.id).await.expect("exists"));
        assert_eq!(users.get_by_username("BOB").await.expect("lookup").id, first.id);
    }
}
