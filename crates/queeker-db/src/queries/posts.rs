//! Post and feed query functions.
//!
//! Listings are ordered by `created_at DESC, id DESC`, a stable total order
//! even when several posts share a timestamp.

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use queeker_types::{ActorId, FeedItem, Post, PostId, PostsQuery};

use crate::queries::users;
use crate::{is_foreign_key_violation, DbError, Result};

/// Post columns, author columns, then the three aggregates.
/// `?1` is the viewer id (NULL for anonymous).
const FEED_SELECT: &str = "
    SELECT p.id, p.user_id, p.content, p.reply_to_post_id, p.created_at,
           u.id, u.username, u.display_name, u.avatar_url, u.created_at,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id),
           (SELECT COUNT(*) FROM posts r WHERE r.reply_to_post_id = p.id),
           EXISTS (SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ?1)
    FROM posts p
    JOIN users u ON u.id = p.user_id";

/// Insert a post or reply and return the stored row.
///
/// Runs in one transaction: when `reply_to_post_id` is set, the target must
/// already exist. Ids are strictly increasing, so the new post is always later
/// than the post it replies to.
pub fn insert(
    conn: &Connection,
    author_id: ActorId,
    content: &str,
    reply_to_post_id: Option<PostId>,
    created_at: u64,
) -> Result<Post> {
    let tx = conn.unchecked_transaction()?;

    if let Some(parent) = reply_to_post_id {
        if !exists(&tx, parent)? {
            debug!(post = parent, "reply target missing");
            return Err(DbError::NotFound("post".into()));
        }
    }

    tx.execute(
        "INSERT INTO posts (user_id, content, reply_to_post_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![author_id, content, reply_to_post_id, created_at as i64],
    )
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            DbError::NotFound("user".into())
        } else {
            DbError::Sqlite(e)
        }
    })?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(Post {
        id,
        author_id,
        content: content.to_string(),
        reply_to_post_id,
        created_at,
    })
}

/// Check whether a post exists.
pub fn exists(conn: &Connection, id: PostId) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM posts WHERE id = ?1", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Get one post with aggregates as of now, relative to `viewer`.
pub fn get_feed_item(
    conn: &Connection,
    id: PostId,
    viewer: Option<ActorId>,
) -> Result<Option<FeedItem>> {
    let item = conn
        .query_row(
            &format!("{FEED_SELECT} WHERE p.id = ?2"),
            rusqlite::params![viewer, id],
            map_feed_item,
        )
        .optional()?;
    Ok(item)
}

/// List posts matching `query`, newest first.
pub fn list(
    conn: &Connection,
    query: &PostsQuery,
    viewer: Option<ActorId>,
) -> Result<Vec<FeedItem>> {
    let mut stmt = conn.prepare(&format!(
        "{FEED_SELECT}
         WHERE (?2 IS NULL OR p.user_id = ?2)
           AND (?3 IS NULL OR p.reply_to_post_id = ?3)
           AND (?4 = 0 OR p.reply_to_post_id IS NULL)
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?5 OFFSET ?6"
    ))?;

    let rows = stmt
        .query_map(
            rusqlite::params![
                viewer,
                query.author_id,
                query.reply_to_post_id,
                query.roots_only,
                query.limit as i64,
                query.offset as i64,
            ],
            map_feed_item,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Total number of posts. Upper bound for any reply chain length.
pub fn count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(count as u64)
}

fn post_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(offset)?,
        author_id: row.get(offset + 1)?,
        content: row.get(offset + 2)?,
        reply_to_post_id: row.get(offset + 3)?,
        created_at: row.get::<_, i64>(offset + 4)? as u64,
    })
}

fn map_feed_item(row: &Row<'_>) -> rusqlite::Result<FeedItem> {
    Ok(FeedItem {
        post: post_at(row, 0)?,
        author: users::actor_at(row, 5)?,
        like_count: row.get::<_, i64>(10)? as u64,
        reply_count: row.get::<_, i64>(11)? as u64,
        viewer_liked: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::likes;

    fn test_db() -> (Connection, ActorId, ActorId) {
        let conn = crate::open_memory().expect("open test db");
        let alice = users::insert(&conn, "alice", Some("Alice"), "https://img/a.png", 1)
            .expect("insert alice");
        let bob = users::insert(&conn, "bob", None, "https://img/b.png", 1).expect("insert bob");
        (conn, alice, bob)
    }

    #[test]
    fn test_insert_and_get() {
        let (conn, alice, _) = test_db();
        let post = insert(&conn, alice, "hello", None, 100).expect("insert");
        assert!(post.is_root());

        let item = get_feed_item(&conn, post.id, None)
            .expect("query")
            .expect("present");
        assert_eq!(item.post, post);
        assert_eq!(item.author.username, "alice");
        assert_eq!(item.like_count, 0);
        assert_eq!(item.reply_count, 0);
        assert!(!item.viewer_liked);
    }

    #[test]
    fn test_reply_requires_existing_parent() {
        let (conn, alice, _) = test_db();
        let result = insert(&conn, alice, "orphan", Some(404), 100);
        assert!(matches!(result, Err(DbError::NotFound(ref what)) if what == "post"));
        assert_eq!(count(&conn).expect("count"), 0, "nothing written");
    }

    #[test]
    fn test_unknown_author() {
        let (conn, _, _) = test_db();
        let result = insert(&conn, 999, "who?", None, 100);
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_reply_ids_increase() {
        let (conn, alice, bob) = test_db();
        let root = insert(&conn, alice, "root", None, 100).expect("root");
        let reply = insert(&conn, bob, "reply", Some(root.id), 100).expect("reply");
        assert!(reply.id > root.id);
        let stored = get_feed_item(&conn, reply.id, None)
            .expect("get")
            .expect("reply stored");
        assert_eq!(stored.post.reply_to_post_id, Some(root.id));
    }

    #[test]
    fn test_aggregates_and_viewer_flag() {
        let (conn, alice, bob) = test_db();
        let post = insert(&conn, alice, "hello", None, 100).expect("insert");
        insert(&conn, bob, "reply 1", Some(post.id), 101).expect("reply");
        insert(&conn, bob, "reply 2", Some(post.id), 102).expect("reply");
        likes::add(&conn, bob, post.id, 103).expect("like");

        let as_bob = get_feed_item(&conn, post.id, Some(bob))
            .expect("query")
            .expect("present");
        assert_eq!(as_bob.like_count, 1);
        assert_eq!(as_bob.reply_count, 2);
        assert!(as_bob.viewer_liked);

        let as_alice = get_feed_item(&conn, post.id, Some(alice))
            .expect("query")
            .expect("present");
        assert!(!as_alice.viewer_liked);
    }

    #[test]
    fn test_list_filters() {
        let (conn, alice, bob) = test_db();
        let a1 = insert(&conn, alice, "a1", None, 100).expect("insert");
        insert(&conn, bob, "b1", None, 101).expect("insert");
        let reply = insert(&conn, bob, "re a1", Some(a1.id), 102).expect("insert");

        let roots = list(&conn, &PostsQuery::root_feed(0), None).expect("list");
        assert_eq!(roots.len(), 2);
        assert!(roots.iter().all(|i| i.post.is_root()));

        let everything = list(&conn, &PostsQuery::default(), None).expect("list");
        assert_eq!(everything.len(), 3);

        let profile = list(&conn, &PostsQuery::profile(bob, 0), None).expect("list");
        assert_eq!(profile.len(), 1);
        assert_eq!(profile[0].post.content, "b1");

        let replies = list(&conn, &PostsQuery::replies(a1.id, 0), None).expect("list");
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].post.id, reply.id);
    }

    #[test]
    fn test_order_ties_broken_by_id() {
        let (conn, alice, _) = test_db();
        let first = insert(&conn, alice, "first", None, 500).expect("insert");
        let second = insert(&conn, alice, "second", None, 500).expect("insert");
        let older = insert(&conn, alice, "older", None, 400).expect("insert");

        let ids: Vec<_> = list(&conn, &PostsQuery::default(), None)
            .expect("list")
            .into_iter()
            .map(|i| i.post.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id, older.id]);
    }

    #[test]
    fn test_pages_are_disjoint() {
        let (conn, alice, _) = test_db();
        for i in 0..60 {
            // Three posts per timestamp to exercise the tie-breaker.
            insert(&conn, alice, &format!("post {i}"), None, 1000 + i / 3).expect("insert");
        }

        let page1 = list(&conn, &PostsQuery::default(), None).expect("page 1");
        let page2 = list(&conn, &PostsQuery::default().with_offset(25), None).expect("page 2");
        let page3 = list(&conn, &PostsQuery::default().with_offset(50), None).expect("page 3");
        assert_eq!((page1.len(), page2.len(), page3.len()), (25, 25, 10));

        let ids: Vec<_> = page1
            .iter()
            .chain(&page2)
            .chain(&page3)
            .map(|i| i.post.id)
            .collect();
        let mut expected = ids.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(ids, expected, "contiguous, descending, no duplicates");
    }
}
