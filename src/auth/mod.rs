//! Authentication primitives.
//!
//! Token issuance/verification for the two token families, password
//! hashing, and the at-rest refresh-token fingerprint.

mod claims;
mod jwt;
mod password;
mod refresh_token;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use jwt::issue_access_token;
pub use jwt::issue_refresh_token;
pub use jwt::verify_access_token;
pub use jwt::verify_refresh_token;
pub use password::hash_password;
pub use password::verify_password;
pub use password::PasswordHash;
pub use refresh_token::refresh_token_fingerprint;
