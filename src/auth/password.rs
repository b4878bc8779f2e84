//! Password hashing and verification.

use bcrypt::{hash, verify};

use crate::error::AppError;

const BCRYPT_COST: u32 = 10;

/// A bcrypt hash produced by [`hash_password`].
///
/// Store write paths accept only this type, so a raw password cannot
/// reach the store unhashed.
#[derive(Debug, Clone)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash a password using bcrypt.
///
/// Neither the input nor the failure detail is ever logged with the
/// password attached.
pub fn hash_password(raw_password: &str) -> Result<PasswordHash, AppError> {
    hash(raw_password, BCRYPT_COST).map(PasswordHash).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        AppError::Internal("Something went wrong".to_string())
    })
}

/// Verify a password against its stored hash.
///
/// `Ok(false)` is a wrong password; `Err` means the verification itself
/// could not run (malformed hash).
pub fn verify_password(raw_password: &str, stored_hash: &str) -> Result<bool, AppError> {
    verify(raw_password, stored_hash).map_err(|e| {
        tracing::error!("Password verification failed: {}", e);
        AppError::Internal("Something went wrong".to_string())
    })
}
