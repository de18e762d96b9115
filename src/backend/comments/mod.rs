//! Threaded comments
//!
//! Comments are one level deep: a top-level comment may carry replies,
//! a reply may not. Deletion is a soft flag; deleted comments drop out of
//! threads but stay in the store until their post is removed.
//!
//! - **`thread`** - assembles the visible thread for a post
//! - **`handlers`** - `/comments` endpoints

pub mod handlers;
pub mod thread;

pub use handlers::{create_comment, delete_comment, list_comments};
pub use thread::{build_thread, CommentView};
