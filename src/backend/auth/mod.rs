//! Authentication Module
//!
//! User accounts, pseudonymous identities and session tokens.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs       - Module exports and documentation
//! ├── identity.rs  - Alias and anonymous id generation
//! ├── password.rs  - bcrypt hashing on the blocking pool
//! ├── sessions.rs  - JWT token management
//! └── handlers/    - HTTP handlers for /users
//! ```
//!
//! # Security
//!
//! - Passwords are stored as bcrypt hashes
//! - Invalid credentials return 401 with no hint which part was wrong
//! - Tokens expire after 30 days

/// Pseudonym generation
pub mod identity;

/// Password hashing
pub mod password;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for user endpoints
pub mod handlers;

pub use handlers::{create_anonymous, list_users, login, signup};
pub use identity::Identity;
