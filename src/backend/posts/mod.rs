//! Posts
//!
//! Creation, owner deletion and listing of posts, with the room and user
//! counters they feed.
//!
//! - **`service`** - the operations, independent of HTTP
//! - **`handlers`** - `/posts` endpoints

pub mod handlers;
pub mod service;

pub use handlers::{create_post, delete_post, list_posts};
pub use service::{NewPost, PostView};
