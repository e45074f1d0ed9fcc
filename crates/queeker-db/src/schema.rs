//! SQL schema definitions.

/// Complete schema for the Queeker v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Users
-- ============================================================

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL COLLATE NOCASE,
    display_name TEXT,
    avatar_url TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username);

-- ============================================================
-- Posts & replies
-- ============================================================

-- AUTOINCREMENT keeps ids strictly increasing, so a reply always
-- references a post with a smaller id.
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    content TEXT NOT NULL CHECK (length(trim(content)) > 0),
    reply_to_post_id INTEGER REFERENCES posts(id),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_order ON posts(created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id);
CREATE INDEX IF NOT EXISTS idx_posts_reply_to ON posts(reply_to_post_id);

-- ============================================================
-- Likes
-- ============================================================

CREATE TABLE IF NOT EXISTS likes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    post_id INTEGER NOT NULL REFERENCES posts(id),
    created_at INTEGER NOT NULL,
    UNIQUE (user_id, post_id)
);

CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id);

-- ============================================================
-- Rate limiter log
-- ============================================================

CREATE TABLE IF NOT EXISTS rate_limit_events (
    limit_key TEXT NOT NULL,
    at_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_rate_limit_key ON rate_limit_events(limit_key, at_ms);
"#;
