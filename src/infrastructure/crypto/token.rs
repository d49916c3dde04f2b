//! Session token generation.
//!
//! The raw token only ever travels in the cookie; storage keys on its hash.

use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::shared::InfraError;

const TOKEN_BYTES: usize = 32;

/// Create a new random session token for the session cookie.
pub fn generate_session_token() -> Result<String, InfraError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| InfraError::Crypto(format!("failed to generate session token: {}", e)))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hex SHA-256 of a session token, used as the session record id.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = generate_session_token().unwrap();
        let b = generate_session_token().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn hash_is_stable_hex() {
        let hash = hash_session_token("token");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_session_token("token"));
        assert_ne!(hash, hash_session_token("other"));
    }
}
