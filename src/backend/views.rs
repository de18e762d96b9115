//! Display projections
//!
//! Listings attach author and room display fields at query time rather
//! than storing them on each row. `ProfileCache` memoizes the lookups for
//! the length of one request so a page of posts by the same author costs
//! one user read.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::backend::store::{Store, StoreResult};
use crate::shared::{Room, User};

/// Public display fields of a user
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: Uuid,
    pub name: String,
    pub alias: Option<String>,
    pub anonymous_id: Option<String>,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            alias: user.alias.clone(),
            anonymous_id: user.anonymous_id.clone(),
        }
    }
}

/// Display fields of a room
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub gradient: String,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id,
            name: room.name.clone(),
            icon: room.icon.clone(),
            gradient: room.gradient.clone(),
        }
    }
}

/// Per-request lookup cache for authors and rooms
pub struct ProfileCache<'a> {
    store: &'a dyn Store,
    authors: HashMap<Uuid, Option<AuthorView>>,
    rooms: HashMap<Uuid, Option<RoomView>>,
}

impl<'a> ProfileCache<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            authors: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    /// `None` when the user no longer exists
    pub async fn author(&mut self, id: Uuid) -> StoreResult<Option<AuthorView>> {
        if let Some(cached) = self.authors.get(&id) {
            return Ok(cached.clone());
        }
        let view = self.store.find_user(id).await?.as_ref().map(AuthorView::from);
        self.authors.insert(id, view.clone());
        Ok(view)
    }

    /// `None` when the room no longer exists
    pub async fn room(&mut self, id: Uuid) -> StoreResult<Option<RoomView>> {
        if let Some(cached) = self.rooms.get(&id) {
            return Ok(cached.clone());
        }
        let view = self.store.find_room(id).await?.as_ref().map(RoomView::from);
        self.rooms.insert(id, view.clone());
        Ok(view)
    }
}
