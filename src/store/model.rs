//! Account records and their public projection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{hash_password, PasswordHash};
use crate::error::AppError;

/// Internal account record.
///
/// Deliberately not serializable: anything that leaves the service goes
/// through [`UserProfile`], so `password_hash` and `refresh_token_hash`
/// structurally cannot appear in a response.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub password_hash: String,
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for account creation; the password arrives already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub password_hash: PasswordHash,
}

impl NewUser {
    /// Normalizes the identity fields (trim; lower-case username and
    /// email) and hashes the raw password. The only way to produce a
    /// storable account.
    pub fn new(
        username: &str,
        email: &str,
        full_name: &str,
        raw_password: &str,
        avatar_url: String,
        cover_image_url: Option<String>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            username: username.trim().to_lowercase(),
            email: email.trim().to_lowercase(),
            full_name: full_name.trim().to_string(),
            avatar_url,
            cover_image_url,
            password_hash: hash_password(raw_password)?,
        })
    }
}

/// Public projection of a [`User`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar_url.clone(),
            cover_image: user.cover_image_url.clone(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "chai".to_string(),
            email: "chai@example.com".to_string(),
            full_name: "Chai Aur Code".to_string(),
            avatar_url: "https://media.test/avatar.png".to_string(),
            cover_image_url: Some("https://media.test/cover.png".to_string()),
            password_hash: "$2b$10$irrelevant".to_string(),
            refresh_token_hash: Some("fingerprint".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_user_normalization() {
        let new_user = NewUser::new(
            "  ChaiAurCode ",
            " Chai@Example.COM ",
            "  Chai Aur Code  ",
            "chai-aur-code",
            "https://media.test/avatar.png".to_string(),
            None,
        )
        .expect("Failed to build user");

        assert_eq!("chaiaurcode", new_user.username);
        assert_eq!("chai@example.com", new_user.email);
        assert_eq!("Chai Aur Code", new_user.full_name);
    }

    #[test]
    fn test_new_user_password_hashed() {
        let new_user = NewUser::new(
            "chai",
            "chai@example.com",
            "Chai Aur Code",
            "chai-aur-code",
            "https://media.test/avatar.png".to_string(),
            None,
        )
        .expect("Failed to build user");

        assert_ne!("chai-aur-code", new_user.password_hash.as_str());
    }

    #[test]
    fn test_profile_field_set() {
        let profile = UserProfile::from(&sample_user());
        let value = serde_json::to_value(&profile).expect("Failed to serialize profile");

        let mut keys: Vec<_> = value
            .as_object()
            .expect("Profile should serialize to an object")
            .keys()
            .cloned()
            .collect();
        keys.sort();

        assert_eq!(
            vec![
                "avatar",
                "coverImage",
                "createdAt",
                "email",
                "fullName",
                "id",
                "updatedAt",
                "username",
            ],
            keys
        );
    }

    #[test]
    fn test_profile_projection() {
        let user = sample_user();
        let profile = UserProfile::from(&user);

        assert_eq!(user.id.to_string(), profile.id);
        assert_eq!(user.username, profile.username);
        assert_eq!(user.avatar_url, profile.avatar);
        assert_eq!(user.cover_image_url, profile.cover_image);
    }
}
