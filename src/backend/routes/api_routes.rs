/**
 * API Route Table
 *
 * # Routes
 *
 * ## Users
 * - `GET /users`, `POST /users` - list, sign up
 * - `POST /users/login`, `POST /users/anonymous`
 * - `GET /users/{id}/stats`
 *
 * ## Content
 * - `GET /posts`, `POST /posts`, `DELETE /posts/{id}`
 * - `POST /reactions`, `DELETE /reactions`, `GET /reactions/{postId}`
 * - `GET /rooms`, `POST /rooms`, `GET /rooms/{id}`
 * - `POST /comments`, `GET /comments/{postId}`, `DELETE /comments/{commentId}`
 *
 * ## Badges
 * - `GET /badges/{userId}`, `POST /badges/{userId}/check`
 *
 * ## Operations
 * - `GET /health`, `GET /debug/sessions`
 *
 * `GET` and `DELETE` on `/comments/{id}` share one path pattern: the
 * segment is a post id for `GET` and a comment id for `DELETE`.
 */

use axum::routing::{delete, get, post};
use axum::Router;

use crate::backend::auth::{create_anonymous, list_users, login, signup};
use crate::backend::badges::{check_badges, list_badges, user_stats};
use crate::backend::comments::{create_comment, delete_comment, list_comments};
use crate::backend::health::{health, session_stats};
use crate::backend::posts::{create_post, delete_post, list_posts};
use crate::backend::reactions::{add_reaction, list_reactions, remove_reaction};
use crate::backend::rooms::{create_room, get_room, list_rooms};
use crate::backend::server::state::AppState;

/// All endpoints, unprefixed
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/debug/sessions", get(session_stats))
        // Users
        .route("/users", get(list_users).post(signup))
        .route("/users/login", post(login))
        .route("/users/anonymous", post(create_anonymous))
        .route("/users/{id}/stats", get(user_stats))
        // Posts
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", delete(delete_post))
        // Reactions
        .route("/reactions", post(add_reaction).delete(remove_reaction))
        .route("/reactions/{post_id}", get(list_reactions))
        // Rooms
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}", get(get_room))
        // Comments
        .route("/comments", post(create_comment))
        .route("/comments/{id}", get(list_comments).delete(delete_comment))
        // Badges
        .route("/badges/{user_id}", get(list_badges))
        .route("/badges/{user_id}/check", post(check_badges))
}
