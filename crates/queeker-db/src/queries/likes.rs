//! Like relation query functions.
//!
//! `UNIQUE (user_id, post_id)` guarantees at most one like per pair; add and
//! remove are single statements, so concurrent callers cannot duplicate rows.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use queeker_types::{ActorId, PostId};

use crate::{is_foreign_key_violation, DbError, Result};

/// Check whether `actor` likes `post`.
pub fn exists(conn: &Connection, actor: ActorId, post: PostId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM likes WHERE user_id = ?1 AND post_id = ?2",
            [actor, post],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Add a like. Returns `false` if it already existed.
pub fn add(conn: &Connection, actor: ActorId, post: PostId, created_at: u64) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![actor, post, created_at as i64],
        )
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                debug!(post, "like target missing");
                DbError::NotFound("post".into())
            } else {
                DbError::Sqlite(e)
            }
        })?;
    Ok(inserted == 1)
}

/// Remove a like. Returns `false` if there was nothing to remove.
pub fn remove(conn: &Connection, actor: ActorId, post: PostId) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
        [actor, post],
    )?;
    Ok(removed == 1)
}

/// Number of likes on a post.
pub fn count_for_post(conn: &Connection, post: PostId) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
        [post],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{posts, users};

    fn test_db() -> (Connection, ActorId, PostId) {
        let conn = crate::open_memory().expect("open test db");
        let alice = users::insert(&conn, "alice", None, "https://img/a.png", 1).expect("user");
        let post = posts::insert(&conn, alice, "hello", None, 10).expect("post");
        (conn, alice, post.id)
    }

    #[test]
    fn test_add_is_idempotent() {
        let (conn, alice, post) = test_db();
        assert!(add(&conn, alice, post, 20).expect("first add"));
        assert!(!add(&conn, alice, post, 21).expect("second add"));
        assert_eq!(count_for_post(&conn, post).expect("count"), 1);
        assert!(exists(&conn, alice, post).expect("exists"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (conn, alice, post) = test_db();
        assert!(!remove(&conn, alice, post).expect("remove absent"));
        add(&conn, alice, post, 20).expect("add");
        assert!(remove(&conn, alice, post).expect("remove"));
        assert!(!remove(&conn, alice, post).expect("remove again"));
        assert_eq!(count_for_post(&conn, post).expect("count"), 0);
    }

    #[test]
    fn test_like_missing_post() {
        let (conn, alice, post) = test_db();
        let result = add(&conn, alice, post + 100, 20);
        assert!(matches!(result, Err(DbError::NotFound(ref what)) if what == "post"));
    }
}
