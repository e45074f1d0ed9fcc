//! Integration test: the hello/like scenario.
//!
//! Actor 1 posts "hello", actor 2 likes it. The like shows up for everyone as
//! a count, but only actor 2 sees `viewer_liked`.

mod common;

use queeker_engine::RequestContext;
use queeker_types::{LikeAction, ResponseCode};

#[tokio::test]
async fn hello_like_scenario() {
    let h = common::harness();
    let (alice, alice_ctx) = h.sign_in("alice").await;
    let (bob, bob_ctx) = h.sign_in("bob").await;
    assert_ne!(alice.id, bob.id);

    let hello = h
        .engine
        .mutations
        .posts_create(&alice_ctx, "hello", None)
        .await;
    assert_eq!(hello.code, ResponseCode::Ok);
    assert_eq!(hello.message, "success");
    let hello = hello.data.expect("item");
    assert_eq!(hello.like_count, 0);
    assert_eq!(hello.reply_count, 0);
    assert!(!hello.viewer_liked);

    let like = h
        .engine
        .mutations
        .likes_set(&bob_ctx, hello.id(), LikeAction::Like)
        .await;
    assert!(like.is_success());

    let as_bob = h.engine.feed.root_feed(&bob_ctx, 0).await.data.expect("feed");
    assert_eq!(as_bob.len(), 1);
    assert_eq!(as_bob[0].like_count, 1);
    assert!(as_bob[0].viewer_liked);

    let as_alice = h.engine.feed.root_feed(&alice_ctx, 0).await.data.expect("feed");
    assert_eq!(as_alice[0].like_count, 1);
    assert!(!as_alice[0].viewer_liked);

    let anonymous = h
        .engine
        .feed
        .root_feed(&RequestContext::anonymous(), 0)
        .await
        .data
        .expect("feed");
    assert_eq!(anonymous[0].like_count, 1);
    assert!(!anonymous[0].viewer_liked);

    let profile = h
        .engine
        .feed
        .profile_feed(&bob_ctx, alice.id, 0)
        .await
        .data
        .expect("profile");
    assert_eq!(profile[0].author.username, "alice");
}

#[tokio::test]
async fn reply_counts_on_parent() {
    let h = common::harness();
    let (_, alice_ctx) = h.sign_in("alice").await;
    let (_, bob_ctx) = h.sign_in("bob").await;

    let root = h.post(&alice_ctx, "root", None).await;
    h.post(&bob_ctx, "first", Some(root.id())).await;
    h.post(&bob_ctx, "second", Some(root.id())).await;

    let thread = h
        .engine
        .feed
        .posts_get_by_id(&alice_ctx, &root.id().to_string())
        .await
        .data
        .expect("thread");
    assert_eq!(thread.post.reply_count, 2);
    let contents: Vec<_> = thread.replies.iter().map(|r| r.post.content.as_str()).collect();
    assert_eq!(contents, vec!["second", "first"]);

    let feed = h.engine.feed.root_feed(&alice_ctx, 0).await.data.expect("feed");
    assert_eq!(feed.len(), 1, "replies stay out of the root feed");
}
