//! User Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request and response types
//! ├── signup.rs    - POST /users
//! ├── login.rs     - POST /users/login
//! ├── anonymous.rs - POST /users/anonymous
//! └── list.rs      - GET /users
//! ```

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Anonymous identity handler
pub mod anonymous;

/// User listing handler
pub mod list;

pub use anonymous::create_anonymous;
pub use list::list_users;
pub use login::login;
pub use signup::signup;
pub use types::{AnonymousResponse, LoginRequest, LoginResponse, SignupRequest, SignupResponse};
