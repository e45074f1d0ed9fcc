//! The calls the controllers make.
//!
//! Implementations fold transport failures into an `Internal` envelope, so a
//! controller only ever sees `{ code, message, data }`.

use std::future::Future;

use queeker_types::{ApiResponse, FeedItem, LikeAction, PostId, PostsQuery, ThreadItem};

pub trait FeedApi: Send + Sync {
    fn set_like(
        &self,
        post_id: PostId,
        action: LikeAction,
    ) -> impl Future<Output = ApiResponse<()>> + Send;

    fn create_post(
        &self,
        content: &str,
        reply_to_post_id: Option<PostId>,
    ) -> impl Future<Output = ApiResponse<FeedItem>> + Send;

    fn get_posts(&self, query: PostsQuery) -> impl Future<Output = ApiResponse<Vec<FeedItem>>> + Send;

    fn get_thread(&self, post_id: PostId) -> impl Future<Output = ApiResponse<ThreadItem>> + Send;
}
