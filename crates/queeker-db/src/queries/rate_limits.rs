//! Sliding-window log for the rate limiter.

use rusqlite::Connection;

use crate::Result;

/// Record a hit for `key` at `now_ms` and return the number of hits inside
/// the trailing window `(now_ms - window_ms, now_ms]`, this one included.
///
/// Pruning, insert and count run in one transaction so two callers can never
/// both observe the same count.
pub fn record_and_count(conn: &Connection, key: &str, now_ms: u64, window_ms: u64) -> Result<u64> {
    let tx = conn.unchecked_transaction()?;
    let cutoff = now_ms.saturating_sub(window_ms) as i64;

    tx.execute(
        "DELETE FROM rate_limit_events WHERE limit_key = ?1 AND at_ms <= ?2",
        rusqlite::params![key, cutoff],
    )?;
    tx.execute(
        "INSERT INTO rate_limit_events (limit_key, at_ms) VALUES (?1, ?2)",
        rusqlite::params![key, now_ms as i64],
    )?;
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM rate_limit_events WHERE limit_key = ?1 AND at_ms > ?2",
        rusqlite::params![key, cutoff],
        |row| row.get(0),
    )?;

    tx.commit()?;
    Ok(count as u64)
}

/// Drop every entry older than `older_than_ms`, across all keys.
pub fn prune(conn: &Connection, older_than_ms: u64) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM rate_limit_events WHERE at_ms <= ?1",
        [older_than_ms as i64],
    )?;
    Ok(removed)
}
