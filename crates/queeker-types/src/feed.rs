//! Post, like and derived feed structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Actor, ActorId, PostId, Timestamp, PAGE_SIZE};

/// A post or reply. Immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Post {
    #[ts(type = "number")]
    pub id: PostId,
    #[ts(type = "number")]
    pub author_id: ActorId,
    pub content: String,
    /// None for root posts.
    #[ts(type = "number | null")]
    pub reply_to_post_id: Option<PostId>,
    #[ts(type = "number")]
    pub created_at: Timestamp,
}

impl Post {
    pub fn is_root(&self) -> bool {
        self.reply_to_post_id.is_none()
    }
}

/// A post enriched with its author, aggregates and the viewer-relative like flag.
///
/// Computed per query, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct FeedItem {
    pub post: Post,
    pub author: Actor,
    #[ts(type = "number")]
    pub like_count: u64,
    #[ts(type = "number")]
    pub reply_count: u64,
    /// False when no actor is authenticated.
    pub viewer_liked: bool,
}

impl FeedItem {
    /// View of a post that was just created: no likes, no replies.
    pub fn fresh(post: Post, author: Actor) -> Self {
        Self {
            post,
            author,
            like_count: 0,
            reply_count: 0,
            viewer_liked: false,
        }
    }

    pub fn id(&self) -> PostId {
        self.post.id
    }
}

/// Single post view with its parent chain and direct replies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct ThreadItem {
    pub post: FeedItem,
    /// Root first, ending at the direct parent. Empty for root posts.
    pub ancestors: Vec<FeedItem>,
    /// First page of direct replies, newest first.
    pub replies: Vec<FeedItem>,
}

/// Requested like state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LikeAction {
    Like,
    Unlike,
}

impl LikeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LikeAction::Like => "like",
            LikeAction::Unlike => "unlike",
        }
    }
}

impl fmt::Display for LikeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and page selection for feed listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub author_id: Option<ActorId>,
    #[serde(default)]
    pub reply_to_post_id: Option<PostId>,
    /// Exclude replies.
    #[serde(default)]
    pub roots_only: bool,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    PAGE_SIZE
}

impl Default for PostsQuery {
    fn default() -> Self {
        Self {
            author_id: None,
            reply_to_post_id: None,
            roots_only: false,
            offset: 0,
            limit: PAGE_SIZE,
        }
    }
}

impl PostsQuery {
    /// Home timeline: root posts from everyone.
    pub fn root_feed(offset: u32) -> Self {
        Self {
            roots_only: true,
            offset,
            ..Self::default()
        }
    }

    /// Root posts of one author.
    pub fn profile(author_id: ActorId, offset: u32) -> Self {
        Self {
            author_id: Some(author_id),
            roots_only: true,
            offset,
            ..Self::default()
        }
    }

    /// Direct replies to a post.
    pub fn replies(post_id: PostId, offset: u32) -> Self {
        Self {
            reply_to_post_id: Some(post_id),
            offset,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}
