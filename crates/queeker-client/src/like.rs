//! Optimistic like toggle for one post.
//!
//! `begin` flips the visible state immediately and remembers what it replaced;
//! `resolve` either keeps the flip or restores exactly the remembered state.
//! While a toggle is tentative the trigger is disabled.

use queeker_types::{ApiResponse, FeedItem, LikeAction, PostId};

use crate::api::FeedApi;
use crate::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Idle,
    /// Request in flight; `prev_*` is what to restore on failure.
    Tentative { prev_liked: bool, prev_count: u64 },
}

#[derive(Debug, Clone)]
pub struct LikeToggle {
    post_id: PostId,
    liked: bool,
    count: u64,
    signed_in: bool,
    state: LikeState,
}

impl LikeToggle {
    pub fn new(item: &FeedItem, signed_in: bool) -> Self {
        Self {
            post_id: item.id(),
            liked: item.viewer_liked,
            count: item.like_count,
            signed_in,
            state: LikeState::Idle,
        }
    }

    pub fn liked(&self) -> bool {
        self.liked
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn state(&self) -> LikeState {
        self.state
    }

    /// Whether the trigger should be disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self.state, LikeState::Tentative { .. })
    }

    /// Apply the optimistic flip and return the action to send.
    pub fn begin(&mut self) -> Result<LikeAction> {
        if !self.signed_in {
            return Err(ClientError::NotSignedIn);
        }
        if self.is_busy() {
            return Err(ClientError::Busy);
        }

        self.state = LikeState::Tentative {
            prev_liked: self.liked,
            prev_count: self.count,
        };
        let action = if self.liked {
            self.count = self.count.saturating_sub(1);
            LikeAction::Unlike
        } else {
            self.count += 1;
            LikeAction::Like
        };
        self.liked = !self.liked;
        Ok(action)
    }

    /// Commit on success, otherwise roll back and return the server's message.
    pub fn resolve(&mut self, response: &ApiResponse<()>) -> Result<()> {
        let LikeState::Tentative {
            prev_liked,
            prev_count,
        } = self.state
        else {
            return Ok(());
        };
        self.state = LikeState::Idle;

        if response.is_success() {
            return Ok(());
        }
        self.liked = prev_liked;
        self.count = prev_count;
        Err(ClientError::Rejected {
            code: response.code,
            message: response.message.clone(),
        })
    }

    /// `begin`, send, `resolve`.
    pub async fn toggle<A: FeedApi>(&mut self, api: &A) -> Result<()> {
        let action = self.begin()?;
        let response = api.set_like(self.post_id, action).await;
        self.resolve(&response)
    }

    /// Copy the visible state onto a feed item.
    pub fn apply_to(&self, item: &mut FeedItem) {
        if item.id() == self.post_id {
            item.viewer_liked = self.liked;
            item.like_count = self.count;
        }
    }
}
