//! User (actor) query functions.

use rusqlite::{Connection, OptionalExtension, Row};

use queeker_types::{Actor, ActorId};

use crate::{is_unique_violation, DbError, Result};

const USER_COLUMNS: &str = "id, username, display_name, avatar_url, created_at";

/// Insert a new user and return its id.
///
/// `username` is expected to be normalized (lowercase) already; uniqueness is
/// case-insensitive regardless.
pub fn insert(
    conn: &Connection,
    username: &str,
    display_name: Option<&str>,
    avatar_url: &str,
    created_at: u64,
) -> Result<ActorId> {
    conn.execute(
        "INSERT INTO users (username, display_name, avatar_url, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![username, display_name, avatar_url, created_at as i64],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DbError::Constraint(format!("username '{username}' already taken"))
        } else {
            DbError::Sqlite(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

/// Get a user by id.
pub fn get(conn: &Connection, id: ActorId) -> Result<Actor> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        map_actor,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("user".into()),
        other => DbError::Sqlite(other),
    })
}

/// Get a user by handle (case-insensitive).
pub fn get_by_username(conn: &Connection, username: &str) -> Result<Actor> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
        [username],
        map_actor,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("user".into()),
        other => DbError::Sqlite(other),
    })
}

/// Check whether a user row exists.
pub fn exists(conn: &Connection, id: ActorId) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Map a row laid out as `USER_COLUMNS` starting at `offset`.
pub(crate) fn actor_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Actor> {
    Ok(Actor {
        id: row.get(offset)?,
        username: row.get(offset + 1)?,
        display_name: row.get(offset + 2)?,
        avatar_url: row.get(offset + 3)?,
        created_at: row.get::<_, i64>(offset + 4)? as u64,
    })
}

fn map_actor(row: &Row<'_>) -> rusqlite::Result<Actor> {
    actor_at(row, 0)
}
