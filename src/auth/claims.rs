//! Claim sets for the two token families (RFC 7519 registered claims
//! plus our own).
//!
//! Access tokens carry the profile fields a consumer may want without a
//! store round trip. Refresh tokens carry only the subject and a random
//! token id, so two tokens minted for the same user within the same
//! second are still distinct values.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::User;

const TOKEN_ID_LENGTH: usize = 24;

/// Claims embedded in access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user id as UUID string)
    pub sub: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(user: &User, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    /// Extract the user id from the subject claim.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid Access Token".to_string()))
    }
}

/// Claims embedded in refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    /// Random token id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            jti: random_token_id(),
            iat: now,
            exp: now + expiry_seconds,
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))
    }
}

fn random_token_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "chai".to_string(),
            email: "chai@example.com".to_string(),
            full_name: "Chai Aur Code".to_string(),
            avatar_url: "https://media.test/avatar.png".to_string(),
            cover_image_url: None,
            password_hash: "$2b$10$irrelevant".to_string(),
            refresh_token_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_claims_creation() {
        let user = sample_user();
        let claims = AccessClaims::new(&user, 900);

        assert_eq!(user.id.to_string(), claims.sub);
        assert_eq!(user.username, claims.username);
        assert_eq!(user.email, claims.email);
        assert_eq!(user.full_name, claims.full_name);
        assert_eq!(claims.iat + 900, claims.exp);
    }

    #[test]
    fn test_user_id_extraction() {
        let user = sample_user();
        let claims = AccessClaims::new(&user, 900);

        assert_eq!(user.id, claims.user_id().unwrap());
    }

    #[test]
    fn test_invalid_user_id() {
        let user = sample_user();
        let mut claims = AccessClaims::new(&user, 900);
        claims.sub = "not-a-uuid".to_string();

        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_refresh_claims_unique_jti() {
        let user_id = Uuid::new_v4();
        let first = RefreshClaims::new(user_id, 864000);
        let second = RefreshClaims::new(user_id, 864000);

        assert_eq!(first.sub, second.sub);
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_jti_alphanumeric() {
        let claims = RefreshClaims::new(Uuid::new_v4(), 864000);

        assert_eq!(TOKEN_ID_LENGTH, claims.jti.len());
        assert!(claims.jti.chars().all(|c| c.is_alphanumeric()));
    }
}
