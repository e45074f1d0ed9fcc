//! Post and reply composer.
//!
//! Submitting prepends a placeholder item with a negative local id so the
//! post shows up at once. The server's answer either replaces the placeholder
//! with the canonical item or removes it again.

use queeker_types::{validate_content, Actor, ApiResponse, FeedItem, Post, PostId};

use crate::api::FeedApi;
use crate::{ClientError, Result};

#[derive(Debug)]
pub struct Composer {
    author: Actor,
    reply_to: Option<PostId>,
    /// Local id of the placeholder awaiting an answer.
    pending: Option<PostId>,
    next_local_id: PostId,
}

impl Composer {
    /// Composer for root posts.
    pub fn new(author: Actor) -> Self {
        Self {
            author,
            reply_to: None,
            pending: None,
            next_local_id: -1,
        }
    }

    /// Composer for replies to `parent`.
    pub fn reply(author: Actor, parent: PostId) -> Self {
        Self {
            reply_to: Some(parent),
            ..Self::new(author)
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Validate `content` and prepend a placeholder to `items`.
    ///
    /// Returns the placeholder's local id.
    pub fn begin(&mut self, items: &mut Vec<FeedItem>, content: &str, now: u64) -> Result<PostId> {
        if self.pending.is_some() {
            return Err(ClientError::Busy);
        }
        validate_content(content)?;

        let local_id = self.next_local_id;
        self.next_local_id -= 1;
        self.pending = Some(local_id);

        let placeholder = Post {
            id: local_id,
            author_id: self.author.id,
            content: content.to_string(),
            reply_to_post_id: self.reply_to,
            created_at: now,
        };
        items.insert(0, FeedItem::fresh(placeholder, self.author.clone()));
        Ok(local_id)
    }

    /// Settle the pending submission.
    ///
    /// On success the placeholder becomes the server's item and, for replies,
    /// `parent`'s reply count goes up by one. On failure the placeholder is
    /// removed.
    pub fn resolve(
        &mut self,
        items: &mut Vec<FeedItem>,
        parent: Option<&mut FeedItem>,
        response: ApiResponse<FeedItem>,
    ) -> Result<FeedItem> {
        let Some(local_id) = self.pending.take() else {
            return Err(ClientError::Rejected {
                code: response.code,
                message: response.message,
            });
        };
        let slot = items.iter().position(|item| item.id() == local_id);

        match (response.is_success(), response.data) {
            (true, Some(created)) => {
                match slot {
                    Some(i) => items[i] = created.clone(),
                    None => items.insert(0, created.clone()),
                }
                if let Some(parent) = parent {
                    if created.post.reply_to_post_id == Some(parent.id()) {
                        parent.reply_count += 1;
                    }
                }
                Ok(created)
            }
            _ => {
                if let Some(i) = slot {
                    items.remove(i);
                }
                Err(ClientError::Rejected {
                    code: response.code,
                    message: response.message,
                })
            }
        }
    }

    /// `begin`, send, `resolve`.
    pub async fn submit<A: FeedApi>(
        &mut self,
        api: &A,
        items: &mut Vec<FeedItem>,
        parent: Option<&mut FeedItem>,
        content: &str,
        now: u64,
    ) -> Result<FeedItem> {
        self.begin(items, content, now)?;
        let response = api.create_post(content, self.reply_to).await;
        self.resolve(items, parent, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{actor, item, MockApi};
    use queeker_types::{ResponseCode, ValidationError};

    fn created(id: PostId, reply_to: Option<PostId>) -> FeedItem {
        let mut created = item(id, 0, false);
        created.post.reply_to_post_id = reply_to;
        created
    }

    #[test]
    fn test_placeholder_replaced() {
        let mut composer = Composer::new(actor(1, "alice"));
        let mut items = vec![item(3, 0, false)];

        let local = composer.begin(&mut items, "hello", 500).expect("begin");
        assert!(local < 0);
        assert_eq!(items[0].id(), local);
        assert_eq!(items.len(), 2);
        assert!(matches!(
            composer.begin(&mut items, "again", 501),
            Err(ClientError::Busy)
        ));

        let done = composer
            .resolve(&mut items, None, ApiResponse::success(created(4, None)))
            .expect("created");
        assert_eq!(done.id(), 4);
        assert_eq!(items.iter().map(FeedItem::id).collect::<Vec<_>>(), vec![4, 3]);
        assert!(!composer.is_submitting());
    }

    #[test]
    fn test_failure_removes_placeholder() {
        let mut composer = Composer::new(actor(1, "alice"));
        let mut items = vec![item(3, 0, false)];
        composer.begin(&mut items, "hello", 500).expect("begin");

        let err = composer
            .resolve(
                &mut items,
                None,
                ApiResponse::failure(ResponseCode::TooManyRequests, "Too many requests"),
            )
            .expect_err("rejected");
        assert_eq!(err.notice(), "Too many requests");
        assert_eq!(items.iter().map(FeedItem::id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_local_validation() {
        let mut composer = Composer::new(actor(1, "alice"));
        let mut items = Vec::new();
        assert!(matches!(
            composer.begin(&mut items, "  ", 1),
            Err(ClientError::Invalid(ValidationError::EmptyContent))
        ));
        assert!(matches!(
            composer.begin(&mut items, &"y".repeat(281), 1),
            Err(ClientError::Invalid(ValidationError::ContentTooLong))
        ));
        assert!(items.is_empty());
        assert!(!composer.is_submitting());
    }

    #[tokio::test]
    async fn test_reply_bumps_parent() {
        let api = MockApi::default();
        api.creates
            .lock()
            .expect("queue")
            .push_back(ApiResponse::success(created(9, Some(3))));

        let mut parent = item(3, 0, false);
        let mut replies = Vec::new();
        let mut composer = Composer::reply(actor(1, "alice"), 3);

        let reply = composer
            .submit(&api, &mut replies, Some(&mut parent), "re", 10)
            .await
            .expect("reply");
        assert_eq!(reply.post.reply_to_post_id, Some(3));
        assert_eq!(parent.reply_count, 1);
        assert_eq!(replies.len(), 1);
        assert_eq!(api.calls(), vec!["create re Some(3)"]);
    }
}
