//! At-rest form of refresh tokens.
//!
//! The session slot stores a SHA-256 fingerprint, never the token itself;
//! a leaked database row cannot be replayed as a live token.

use sha2::{Digest, Sha256};

/// SHA-256 hex fingerprint of a refresh token.
pub fn refresh_token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let token = "some.refresh.token";

        assert_eq!(
            refresh_token_fingerprint(token),
            refresh_token_fingerprint(token)
        );
    }

    #[test]
    fn test_fingerprint_not_plaintext() {
        let token = "some.refresh.token";
        let fingerprint = refresh_token_fingerprint(token);

        assert_ne!(token, fingerprint);
        // SHA-256 hex digest
        assert_eq!(64, fingerprint.len());
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_tokens_different_fingerprints() {
        assert_ne!(
            refresh_token_fingerprint("token-one"),
            refresh_token_fingerprint("token-two")
        );
    }
}
