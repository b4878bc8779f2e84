//! Postgres-backed account storage.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewUser, StoreError, User, UserStore};
use crate::auth::PasswordHash;

const USER_COLUMNS: &str = "id, username, email, full_name, avatar_url, cover_image_url, \
     password_hash, refresh_token_hash, created_at, updated_at";

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            r#"
            INSERT INTO users ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, $8, $8)
            RETURNING {}
            "#,
            USER_COLUMNS, USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.full_name)
            .bind(&new_user.avatar_url)
            .bind(&new_user.cover_image_url)
            .bind(new_user.password_hash.as_str())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(into_store_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(into_store_error)
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let identifier = identifier.trim().to_lowercase();
        let query = format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $1",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(into_store_error)
    }

    async fn update_password(&self, id: Uuid, new_hash: PasswordHash) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(new_hash.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(into_store_error)?;

        Ok(())
    }

    async fn set_current_refresh(&self, id: Uuid, fingerprint: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET refresh_token_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(fingerprint)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(into_store_error)?;

        Ok(())
    }

    async fn clear_current_refresh(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET refresh_token_hash = NULL, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(into_store_error)?;

        Ok(())
    }

    async fn is_current_refresh(&self, id: Uuid, fingerprint: &str) -> Result<bool, StoreError> {
        let stored = sqlx::query_scalar::<_, Option<String>>(
            "SELECT refresh_token_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(into_store_error)?;

        Ok(matches!(stored.flatten().as_deref(), Some(current) if current == fingerprint))
    }

    async fn rotate_current_refresh(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        // Row-atomic compare-and-swap: rows_affected is 0 when another
        // rotation already replaced the slot.
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = $1, updated_at = $2 \
             WHERE id = $3 AND refresh_token_hash = $4",
        )
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(into_store_error)?;

        Ok(result.rows_affected() == 1)
    }
}

fn into_store_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.code().as_deref() == Some("23505") {
            return StoreError::Conflict;
        }
    }

    StoreError::Database(error.to_string())
}
