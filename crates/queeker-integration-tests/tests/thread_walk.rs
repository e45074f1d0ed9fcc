//! Integration test: thread view ancestor walk.

mod common;

use queeker_engine::RequestContext;
use queeker_types::ResponseCode;

#[tokio::test]
async fn depth_five_chain_has_five_ancestors() {
    let h = common::harness();
    let (_, ctx) = h.sign_in("alice").await;

    let root = h.post(&ctx, "depth 0", None).await;
    let mut chain = vec![root.id()];
    for depth in 1..=5 {
        let parent = *chain.last().expect("parent");
        let reply = h.post(&ctx, &format!("depth {depth}"), Some(parent)).await;
        chain.push(reply.id());
    }

    let thread = h
        .engine
        .feed
        .posts_get_by_id(&RequestContext::anonymous(), &chain[5].to_string())
        .await
        .data
        .expect("thread");

    assert_eq!(thread.ancestors.len(), 5);
    assert!(thread.ancestors[0].post.is_root());
    assert_eq!(
        thread.ancestors.last().expect("parent").id(),
        chain[4],
        "ends at the direct parent"
    );
    let ids: Vec<_> = thread.ancestors.iter().map(|a| a.id()).collect();
    assert_eq!(ids, chain[..5]);
    for (a, b) in thread.ancestors.iter().zip(thread.ancestors.iter().skip(1)) {
        assert_eq!(b.post.reply_to_post_id, Some(a.id()));
    }
}

#[tokio::test]
async fn thread_id_validation() {
    let h = common::harness();
    let anon = RequestContext::anonymous();

    let resp = h.engine.feed.posts_get_by_id(&anon, "not-a-number").await;
    assert_eq!(resp.code, ResponseCode::BadRequest);

    let resp = h.engine.feed.posts_get_by_id(&anon, "999").await;
    assert_eq!(resp.code, ResponseCode::NotFound);
}
