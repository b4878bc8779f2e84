//! Persistent account storage.
//!
//! The service talks to storage only through [`UserStore`]: credential
//! operations plus the session-registry slot operations. Two
//! implementations live here: [`PgUserStore`] for production and
//! [`InMemoryUserStore`] for tests and embedding without Postgres.

mod memory;
mod model;
mod postgres;

pub use memory::InMemoryUserStore;
pub use model::NewUser;
pub use model::User;
pub use model::UserProfile;
pub use postgres::PgUserStore;

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::PasswordHash;
use crate::error::AppError;

/// Storage-layer failure.
#[derive(Debug)]
pub enum StoreError {
    /// A unique constraint (username or email) was violated.
    Conflict,
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict => write!(f, "username or email already taken"),
            StoreError::Database(detail) => write!(f, "database error: {}", detail),
        }
    }
}

impl StdError for StoreError {}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict => {
                AppError::Conflict("Email or Username Already Exists".to_string())
            }
            StoreError::Database(detail) => {
                tracing::error!("Store operation failed: {}", detail);
                AppError::Internal("Something went wrong".to_string())
            }
        }
    }
}

/// Account storage plus the per-user session slot.
///
/// The slot holds the fingerprint of the single live refresh token;
/// `None` means logged out. `rotate_current_refresh` is the only
/// compare-and-swap operation and carries the concurrency guarantee for
/// token rotation: of several rotations racing from the same expected
/// fingerprint, exactly one may succeed.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `StoreError::Conflict` if the username or email is already taken.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Case-normalizes the identifier and matches it against either
    /// the username or the email column.
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Writes only the hash and the update timestamp.
    async fn update_password(&self, id: Uuid, new_hash: PasswordHash) -> Result<(), StoreError>;

    /// Unconditional overwrite of the session slot (login).
    async fn set_current_refresh(&self, id: Uuid, fingerprint: &str) -> Result<(), StoreError>;

    /// Empties the session slot (logout). Idempotent.
    async fn clear_current_refresh(&self, id: Uuid) -> Result<(), StoreError>;

    /// `false` for a missing user, an empty slot, or a different value.
    async fn is_current_refresh(&self, id: Uuid, fingerprint: &str) -> Result<bool, StoreError>;

    /// Atomically replaces the slot with `next` iff it still holds
    /// `expected`; returns whether the swap happened.
    async fn rotate_current_refresh(
        &self,
        id: Uuid,
        expected: &str,
        next: &str,
    ) -> Result<bool, StoreError>;
}
