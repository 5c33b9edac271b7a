//! Password hashing and verification using bcrypt

use crate::core::error::{ChatError, Result};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ChatError::InitializationError(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash
///
/// A malformed digest verifies as false rather than erroring; the caller
/// only ever needs match / no-match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
