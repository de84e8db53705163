//! # auth-adapters
//!
//! Credential hashing and bearer-token implementations of the auth ports.

pub mod password;
#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;
#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenService;
