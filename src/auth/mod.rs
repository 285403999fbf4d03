//! Authentication and authorization
//!
//! - Session tokens for the admin user (HS256 JWT, 30 day lifetime)
//! - Static API-key principals for the database gateway
//! - Argon2 password hashing for stored admin credentials

pub mod api_key;
pub mod password;
pub mod token;

pub use api_key::{digest_passphrase, AccessError, ApiKeyPrincipal, ApiKeyRegistry};
pub use password::{hash_password, verify_password, PasswordError};
pub use token::{bearer_token, Claims, TokenError, TokenService};
