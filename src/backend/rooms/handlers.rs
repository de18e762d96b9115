//! `/rooms` handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::{parse_id, present, ApiJson, ApiQuery};
use crate::backend::posts::service::{self, PostView};
use crate::backend::server::state::AppState;
use crate::backend::store::{constraints, PostQuery};
use crate::shared::Room;

/// Posts shown on a room page
pub const RECENT_POSTS_SHOWN: i64 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct ListRoomsQuery {
    pub trending: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub gradient: Option<String>,
    pub category: Option<String>,
}

/// A room with its newest live posts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: Room,
    pub recent_posts: Vec<PostView>,
}

/// GET /rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListRoomsQuery>,
) -> BackendResult<Json<Vec<Room>>> {
    let trending_only = query.trending.unwrap_or(false);
    let rooms = state.store.list_rooms(trending_only).await?;
    tracing::debug!("Listing {} rooms (trending only: {})", rooms.len(), trending_only);
    Ok(Json(rooms))
}

/// POST /rooms
pub async fn create_room(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRoomRequest>,
) -> BackendResult<(StatusCode, Json<Room>)> {
    let (name, description) = match (present(request.name), present(request.description)) {
        (Some(name), Some(description)) => (name, description),
        _ => {
            tracing::warn!("Room rejected: missing name or description");
            return Err(BackendError::validation("name_and_description_required"));
        }
    };

    let mut room = Room::new(name, description, request.icon, request.gradient, Utc::now());
    room.category = present(request.category);

    state.store.insert_room(&room).await.map_err(|e| {
        tracing::warn!("Room {} not created: {}", room.name, e);
        BackendError::from_store_with(e, constraints::ROOM_NAME, "room_name_taken")
    })?;

    tracing::info!("Room created: {} ({})", room.name, room.id);
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /rooms/{id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> BackendResult<Json<RoomDetail>> {
    let room_id = parse_id(&id, "room_id")?;
    let room = state
        .store
        .find_room(room_id)
        .await?
        .ok_or_else(|| BackendError::not_found("room_not_found"))?;

    let query = PostQuery {
        room_id: Some(room_id),
        limit: RECENT_POSTS_SHOWN,
        offset: 0,
    };
    let recent_posts = service::list(state.store.as_ref(), query, Utc::now()).await?;

    Ok(Json(RoomDetail { room, recent_posts }))
}
