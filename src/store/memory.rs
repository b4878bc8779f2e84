//! In-memory account storage.
//!
//! Backs the integration tests and embedded setups. Uniqueness scans and
//! the rotation compare-and-swap run under the write lock, so the
//! concurrency guarantees match the Postgres implementation.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{NewUser, StoreError, User, UserStore};
use crate::auth::PasswordHash;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, User>>, StoreError> {
        self.users
            .read()
            .map_err(|_| StoreError::Database("user store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, User>>, StoreError> {
        self.users
            .write()
            .map_err(|_| StoreError::Database("user store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.write()?;

        let taken = users
            .values()
            .any(|user| user.username == new_user.username || user.email == new_user.email);
        if taken {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            full_name: new_user.full_name,
            avatar_url: new_user.avatar_url,
            cover_image_url: new_user.cover_image_url,
            password_hash: new_user.password_hash.into_string(),
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let identifier = identifier.trim().to_lowercase();

        Ok(self
            .read()?
            .values()
            .find(|user| user.username == identifier || user.email == identifier)
            .cloned())
    }

    async fn update_password(&self, id: Uuid, new_hash: PasswordHash) -> Result<(), StoreError> {
        if let Some(user) = self.write()?.get_mut(&id) {
            user.password_hash = new_hash.into_string();
            user.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn set_current_refresh(&self, id: Uuid, fingerprint: &str) -> Result<(), StoreError> {
        if let Some(user) = self.write()?.get_mut(&id) {
            user.refresh_token_hash = Some(fingerprint.to_string());
            user.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn clear_current_refresh(&self, id: Uuid) -> Result<(), StoreError> {
        if let Some(user) = self.write()?.get_mut(&id) {
            user.refresh_token_hash = None;
            user.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn is_current_refresh(&self, id: Uuid, fingerprint: &str) -> Result<bool, StoreError> {
        Ok(self
            .read()?
            .get(&id)
            .map(|user| user.refresh_token_hash.as_deref() == Some(fingerprint))
            .unwrap_or(false))
    }

    async fn rotate_current_refresh(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        // One critical section; of N rotations racing from the same
        // expected fingerprint, the first swap flips the slot and the
        // rest see a changed value.
        let mut users = self.write()?;

        match users.get_mut(&id) {
            Some(user) if user.refresh_token_hash.as_deref() == Some(expected) => {
                user.refresh_token_hash = Some(next.to_string());
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
