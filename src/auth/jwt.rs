//! Signing and verification for the two token families.
//!
//! Each family has its own secret. Verification is strict: HS256 only,
//! `exp` required, no clock leeway. Every verification failure collapses
//! into one uniform error per family; the cause is logged, never returned,
//! so responses carry no oracle about why a token was rejected.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::TokenSettings;
use crate::error::AppError;
use crate::store::User;

pub fn issue_access_token(user: &User, settings: &TokenSettings) -> Result<String, AppError> {
    let claims = AccessClaims::new(user, settings.access_token_expiry_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.access_token_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Access token signing failed: {}", e)))
}

pub fn issue_refresh_token(user_id: Uuid, settings: &TokenSettings) -> Result<String, AppError> {
    let claims = RefreshClaims::new(user_id, settings.refresh_token_expiry_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.refresh_token_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Refresh token signing failed: {}", e)))
}

pub fn verify_access_token(
    token: &str,
    settings: &TokenSettings,
) -> Result<AccessClaims, AppError> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(settings.access_token_secret.as_bytes()),
        &strict_validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Access token rejected: {}", e);
        AppError::Unauthorized("Invalid Access Token".to_string())
    })
}

pub fn verify_refresh_token(
    token: &str,
    settings: &TokenSettings,
) -> Result<RefreshClaims, AppError> {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(settings.refresh_token_secret.as_bytes()),
        &strict_validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Refresh token rejected: {}", e);
        AppError::Unauthorized("Invalid refresh token".to_string())
    })
}

/// HS256, expiry required, zero leeway.
fn strict_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_settings() -> TokenSettings {
        TokenSettings {
            access_token_secret: "access-secret-at-least-32-characters".to_string(),
            refresh_token_secret: "refresh-secret-at-least-32-characters".to_string(),
            access_token_expiry_seconds: 900,
            refresh_token_expiry_seconds: 864000,
        }
    }

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
    fn test_generate_and_validate_access_token() {
        let settings = test_settings();
        let user = sample_user();

        let token = issue_access_token(&user, &settings).expect("Failed to issue token");
        let claims = verify_access_token(&token, &settings).expect("Failed to verify token");

        assert_eq!(user.id.to_string(), claims.sub);
        assert_eq!(user.username, claims.username);
        assert_eq!(user.email, claims.email);
        assert_eq!(user.full_name, claims.full_name);
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let settings = test_settings();
        let user_id = Uuid::new_v4();

        let token = issue_refresh_token(user_id, &settings).expect("Failed to issue token");
        let claims = verify_refresh_token(&token, &settings).expect("Failed to verify token");

        assert_eq!(user_id, claims.user_id().unwrap());
    }

    #[test]
    fn test_refresh_tokens_unique() {
        let settings = test_settings();
        let user_id = Uuid::new_v4();

        let first = issue_refresh_token(user_id, &settings).expect("Failed to issue token");
        let second = issue_refresh_token(user_id, &settings).expect("Failed to issue token");

        assert_ne!(first, second);
    }

    #[test]
    fn test_tampered_token() {
        let settings = test_settings();
        let token = issue_access_token(&sample_user(), &settings).expect("Failed to issue token");

        let tampered = format!("{}X", token);
        assert!(verify_access_token(&tampered, &settings).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let settings = test_settings();
        assert!(verify_access_token("not.a.token", &settings).is_err());
        assert!(verify_refresh_token("not.a.token", &settings).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let settings = test_settings();
        let mut other = test_settings();
        other.access_token_secret = "a-completely-different-signing-secret".to_string();

        let token = issue_access_token(&sample_user(), &other).expect("Failed to issue token");
        assert!(verify_access_token(&token, &settings).is_err());
    }

    #[test]
    fn test_cross_family_rejection() {
        let settings = test_settings();
        let user = sample_user();

        let access = issue_access_token(&user, &settings).expect("Failed to issue token");
        let refresh = issue_refresh_token(user.id, &settings).expect("Failed to issue token");

        assert!(verify_refresh_token(&access, &settings).is_err());
        assert!(verify_access_token(&refresh, &settings).is_err());
    }

    #[test]
    fn test_cross_family_rejection_shared_secret() {
        // Claim shapes alone must keep the families apart if the two
        // secrets are ever misconfigured to the same value.
        let mut settings = test_settings();
        settings.refresh_token_secret = settings.access_token_secret.clone();

        let user = sample_user();
        let access = issue_access_token(&user, &settings).expect("Failed to issue token");
        let refresh = issue_refresh_token(user.id, &settings).expect("Failed to issue token");

        assert!(verify_refresh_token(&access, &settings).is_err());
        assert!(verify_access_token(&refresh, &settings).is_err());
    }

    #[test]
    fn test_expired_token() {
        let settings = test_settings();
        let user = sample_user();

        let mut claims = AccessClaims::new(&user, 900);
        claims.iat -= 910;
        claims.exp -= 910;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings.access_token_secret.as_bytes()),
        )
        .expect("Failed to encode token");

        assert!(verify_access_token(&token, &settings).is_err());
    }
}
