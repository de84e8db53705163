//! Argon2-based implementation of `PasswordHasher`.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use domains::{DomainError, PasswordHasher, Result};
use tracing::error;

/// Produces PHC-formatted argon2id hashes with a random salt per call.
#[derive(Default, Clone)]
pub struct Argon2Hasher {
    argon: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                error!(error = %e, "password hashing failed");
                DomainError::internal("password hashing failed")
            })
    }

    /// A malformed stored hash is treated as a mismatch.
    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.argon
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("water123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("water123", &hash));
        assert!(!hasher.verify("water124", &hash));
    }

    #[test]
    fn salts_differ_between_calls() {
        let hasher = Argon2Hasher::new();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!Argon2Hasher::new().verify("anything", "not-a-phc-string"));
    }
}
