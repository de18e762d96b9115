//! Property tests for the one-reaction-per-(post, user) invariant

use chrono::{Duration, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use tearoom::backend::reactions::{react, unreact};
use tearoom::backend::store::{MemoryStore, PostStore, ReactionStore, RoomStore, UserStore};
use tearoom::shared::{Post, PostDuration, ReactionType, Room, User};

#[derive(Debug, Clone)]
enum Op {
    React(usize, ReactionType),
    Unreact(usize, ReactionType),
}

fn reaction_type() -> impl Strategy<Value = ReactionType> {
    prop::sample::select(ReactionType::ALL.to_vec())
}

fn op(users: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..users, reaction_type()).prop_map(|(u, t)| Op::React(u, t)),
        1 => (0..users, reaction_type()).prop_map(|(u, t)| Op::Unreact(u, t)),
    ]
}

async fn seeded(users: usize) -> (MemoryStore, Post, Vec<User>) {
    let store = MemoryStore::new();
    let now = Utc::now();
    let room = Room::new("Gaming", "games", None, None, now);
    store.insert_room(&room).await.unwrap();
    let users: Vec<User> = (0..users)
        .map(|i| User::new(format!("u{}", i), format!("u{}@example.com", i), "h", now))
        .collect();
    for user in &users {
        store.insert_user(user).await.unwrap();
    }
    let post = Post {
        id: Uuid::new_v4(),
        title: "t".into(),
        content: "c".into(),
        author_id: users[0].id,
        room_id: room.id,
        category: "General".into(),
        duration: PostDuration::Day,
        is_voice_note: false,
        expires_at: Some(now + Duration::hours(24)),
        is_expired: false,
        created_at: now,
    };
    store.insert_post(&post).await.unwrap();
    (store, post, users)
}

const USERS: usize = 3;

proptest! {
    #[test]
    fn prop_at_most_one_reaction_matching_last_request(ops in prop::collection::vec(op(USERS), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let (store, post, users) = seeded(USERS).await;
            let mut expected: Vec<Option<ReactionType>> = vec![None; USERS];

            for op in &ops {
                match *op {
                    Op::React(u, kind) => {
                        react(&store, post.id, users[u].id, kind, Utc::now()).await.unwrap();
                        expected[u] = Some(kind);
                    }
                    Op::Unreact(u, kind) => {
                        let result = unreact(&store, post.id, users[u].id, kind).await;
                        if expected[u] == Some(kind) {
                            prop_assert!(result.is_ok());
                            expected[u] = None;
                        } else {
                            prop_assert!(result.is_err());
                        }
                    }
                }
            }

            let rows = store.list_reactions_for_post(post.id).await.unwrap();
            for (u, user) in users.iter().enumerate() {
                let held: Vec<_> = rows.iter().filter(|r| r.user_id == user.id).collect();
                prop_assert!(held.len() <= 1);
                prop_assert_eq!(held.first().map(|r| r.reaction_type), expected[u]);

                let stored = store.find_user(user.id).await.unwrap().unwrap();
                prop_assert_eq!(stored.total_reactions, held.len() as i64);
            }
            Ok(())
        })?;
    }
}
