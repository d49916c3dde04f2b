//! Password hashing utilities
//!
//! bcrypt only reads the first 72 bytes of its input, so passwords are
//! reduced to a hex SHA-256 digest (64 bytes) before hashing. Every byte of
//! the password then affects the stored hash.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use sha2::{Digest, Sha256};

/// bcrypt hasher with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password using bcrypt
    pub fn hash(&self, password: &str) -> Result<String, BcryptError> {
        hash(prehash(password), self.cost)
    }

    /// Verify a password against a hash
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, BcryptError> {
        verify(prehash(password), hash)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

fn prehash(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
