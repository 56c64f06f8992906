mod common;

use blog_service::repositories::FollowRepository;
use common::{body_json, location, post_texts, TestApp};

#[tokio::test]
async fn test_follow_is_idempotent() {
    let app = TestApp::new().await;
    let reader = app.create_user("reader").await;
    let author = app.create_user("auth").await;

    for _ in 0..2 {
        let response = app.get("/auth/follow/", Some(&reader.token)).await;
        assert_eq!(location(&response), "/auth/");
    }

    assert_eq!(app.store.count_followers(author.user.id).await.unwrap(), 1);
    assert!(app
        .store
        .is_following(reader.user.id, author.user.id)
        .await
        .unwrap());

    let profile = body_json(app.get("/auth/", Some(&reader.token)).await).await;
    assert_eq!(profile["following"], true);
    assert_eq!(profile["followersCount"], 1);
}

#[tokio::test]
async fn test_unfollow_removes_edge_and_tolerates_missing_one() {
    let app = TestApp::new().await;
    let reader = app.create_user("reader").await;
    let author = app.create_user("auth").await;

    app.get("/auth/follow/", Some(&reader.token)).await;
    for _ in 0..2 {
        let response = app.get("/auth/unfollow/", Some(&reader.token)).await;
        assert_eq!(location(&response), "/auth/");
    }

    assert_eq!(app.store.count_followers(author.user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_self_follow_creates_nothing() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;

    let response = app.get("/auth/follow/", Some(&author.token)).await;
    assert_eq!(location(&response), "/auth/");
    assert_eq!(app.store.count_followers(author.user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_follow_unknown_user_is_404() {
    let app = TestApp::new().await;
    let reader = app.create_user("reader").await;

    let response = app.get("/nobody/follow/", Some(&reader.token)).await;
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_feed_shows_followed_authors_only() {
    let app = TestApp::new().await;
    let reader = app.create_user("reader").await;
    let stranger = app.create_user("stranger").await;
    let author = app.create_user("auth").await;
    for i in 0..12 {
        app.create_post(&author.user, &format!("Пост {}", i), None)
            .await;
    }

    let before = body_json(app.get("/follow/", Some(&reader.token)).await).await;
    assert!(post_texts(&before).is_empty());

    app.get("/auth/follow/", Some(&reader.token)).await;

    let after = body_json(app.get("/follow/", Some(&reader.token)).await).await;
    assert_eq!(post_texts(&after).len(), 10);
    assert_eq!(after["page"]["count"], 12);

    let unrelated = body_json(app.get("/follow/", Some(&stranger.token)).await).await;
    assert!(post_texts(&unrelated).is_empty());
}
