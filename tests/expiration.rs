//! Expiration Engine integration tests

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::Value;

use common::{parse, spawn_app, spawn_app_with, test_config};
use tearoom::backend::expiration::{
    backfill_missing_expiry, remove_post, run_sweep, ExpirationPolicy,
};
use tearoom::backend::reactions::react;
use tearoom::backend::store::{
    CommentStore, PostStore, ReactionStore, RoomStore, UserCounterDelta, UserStore,
};
use tearoom::shared::{Comment, PostDuration, Reaction, ReactionType, User};

#[tokio::test]
async fn test_sweep_removes_expired_post_and_dependents() {
    let app = spawn_app();
    let author = app.signup_id("Ada").await;
    let fan = app.signup_id("Fan").await;
    let room = app.create_room("Gaming").await;
    let live = app.create_post_id(&author, &room, "live").await;
    let expired = app.insert_expired_post(&author, &room).await;

    // Counters as if the expired post had been created through the API
    app.store
        .adjust_user_counters(parse(&author), UserCounterDelta::posts(1))
        .await
        .unwrap();
    app.store.adjust_room_posts(parse(&room), 1, None).await.unwrap();

    let reaction = Reaction::new(expired.id, parse(&fan), ReactionType::Spicy, Utc::now());
    app.store.insert_reaction(&reaction).await.unwrap();
    let comment = Comment::new(expired.id, parse(&fan), None, "old news", Utc::now());
    app.store.insert_comment(&comment).await.unwrap();
    let reply = Comment::new(expired.id, parse(&author), Some(comment.id), "agreed", Utc::now());
    app.store.insert_comment(&reply).await.unwrap();

    let report = run_sweep(app.store.as_ref(), Utc::now()).await.unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(report.failed, 0);

    assert!(app.store.find_post(expired.id).await.unwrap().is_none());
    assert!(app.store.list_reactions_for_post(expired.id).await.unwrap().is_empty());
    assert!(app.store.list_comments_for_post(expired.id).await.unwrap().is_empty());
    assert!(app.store.find_post(parse(&live)).await.unwrap().is_some());

    let user = app.store.find_user(parse(&author)).await.unwrap().unwrap();
    assert_eq!(user.total_posts, 1);
    let room = app.store.find_room(parse(&room)).await.unwrap().unwrap();
    assert_eq!(room.recent_post_count, 1);

    let second = run_sweep(app.store.as_ref(), Utc::now()).await.unwrap();
    assert_eq!(second.expired, 0);
}

#[tokio::test]
async fn test_expired_post_hidden_before_sweep() {
    let app = spawn_app();
    let author = app.signup_id("Ada").await;
    let room = app.create_room("Gaming").await;
    let expired = app.insert_expired_post(&author, &room).await;

    let listed: Value = app.server.get("/posts").await.json();
    assert!(listed.as_array().unwrap().is_empty());

    let room_page: Value = app.server.get(&format!("/rooms/{}", room)).await.json();
    assert!(room_page["recentPosts"].as_array().unwrap().is_empty());

    let comments = app
        .server
        .get(&format!("/comments/{}", expired.id))
        .await;
    assert_eq!(comments.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_counters_never_go_negative() {
    let app = spawn_app();
    let author = app.signup_id("Ada").await;
    let room = app.create_room("Gaming").await;
    app.insert_expired_post(&author, &room).await;

    run_sweep(app.store.as_ref(), Utc::now()).await.unwrap();

    let user = app.store.find_user(parse(&author)).await.unwrap().unwrap();
    assert_eq!(user.total_posts, 0);
    let room = app.store.find_room(parse(&room)).await.unwrap().unwrap();
    assert_eq!(room.recent_post_count, 0);
}

#[tokio::test]
async fn test_backfill_gives_missing_expiry_a_day() {
    let app = spawn_app();
    let author = app.signup_id("Ada").await;
    let room = app.create_room("Gaming").await;
    let created = Utc::now() - Duration::hours(2);
    let post = app
        .insert_post_expiring(&author, &room, created, None)
        .await;

    let updated = backfill_missing_expiry(app.store.as_ref(), &app.state.policy)
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let stored = app.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.expires_at, Some(created + Duration::hours(24)));
    assert_eq!(stored.duration, PostDuration::Day);
}

#[tokio::test]
async fn test_permanent_posts_when_not_enforced() {
    let mut config = test_config();
    config.enforce_max_duration = false;
    let app = spawn_app_with(config);
    let author = app.signup_id("Ada").await;
    let room = app.create_room("Gaming").await;

    let response = app
        .server
        .post("/posts")
        .json(&serde_json::json!({
            "title": "forever", "content": "c", "authorId": author, "roomId": room,
            "duration": "permanent",
        }))
        .await;
    let post: Value = response.json();
    assert_eq!(post["duration"], "permanent");
    assert!(post["expiresAt"].is_null());

    let policy = ExpirationPolicy {
        default_duration: PostDuration::Day,
        enforce_max_duration: false,
    };
    let updated = backfill_missing_expiry(app.store.as_ref(), &policy).await.unwrap();
    assert_eq!(updated, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reactions_racing_removal_leave_no_orphans() {
    let app = spawn_app();
    let author = app.signup_id("Ada").await;
    let room = app.create_room("Gaming").await;
    let post_id = parse(&app.create_post_id(&author, &room, "going away").await);
    let post = app.store.find_post(post_id).await.unwrap().unwrap();

    let mut reactors = Vec::new();
    for i in 0..16 {
        let user = User::new(format!("r{}", i), format!("r{}@example.com", i), "h", Utc::now());
        app.store.insert_user(&user).await.unwrap();
        reactors.push(user.id);
    }

    let mut tasks = Vec::new();
    for user_id in reactors {
        let store = app.store.clone();
        tasks.push(tokio::spawn(async move {
            react(store.as_ref(), post_id, user_id, ReactionType::Tea, Utc::now()).await
        }));
    }
    let store = app.store.clone();
    let removal = tokio::spawn(async move { remove_post(store.as_ref(), &post).await });

    for task in tasks {
        if let Err(err) = task.await.unwrap() {
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(err.code(), "post_not_found");
        }
    }
    assert!(removal.await.unwrap().unwrap().post_removed);

    assert!(app.store.find_post(post_id).await.unwrap().is_none());
    assert!(app.store.list_reactions_for_post(post_id).await.unwrap().is_empty());
}
