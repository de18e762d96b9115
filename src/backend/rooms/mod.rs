//! Topic rooms
//!
//! Rooms are created through the API or seeded from the default catalog.
//! Their `recent_post_count` and `last_activity` are maintained by post
//! creation and removal, never by the handlers below.

pub mod handlers;

pub use handlers::{create_room, get_room, list_rooms, RoomDetail};
