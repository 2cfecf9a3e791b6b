//! Authentication utilities library
//!
//! - Password hashing (Argon2id, configurable cost)
//! - Session token signing and validation (HS256 JWT)
//! - `Authenticator`, which combines both for login flows
//!
//! # Examples
//!
//! ```
//! use auth::Authenticator;
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(1));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let result = auth.authenticate("password123", &hash, "user123").unwrap();
//!
//! // Later requests: validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.user_id(), Some("user123"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
