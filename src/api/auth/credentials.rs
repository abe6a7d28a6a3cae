//! Password hashing and verification (bcrypt).
//!
//! Verification failure is a boolean, never an error; callers turn `false`
//! into an authentication failure. Both operations are deliberately
//! expensive, so they run on the blocking pool.

use crate::api::error::ApiError;
use bcrypt::DEFAULT_COST;
use tracing::error;

/// Hash a plaintext password for storage. The result is salted and one-way.
///
/// # Errors
///
/// Returns an internal error if hashing fails or the blocking task is cancelled.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    let result = tokio::task::spawn_blocking(move || bcrypt::hash(password, DEFAULT_COST))
        .await
        .map_err(|err| {
            error!("Password hashing task failed: {err}");
            ApiError::internal()
        })?;

    result.map_err(|err| {
        error!("Password hashing failed: {err}");
        ApiError::internal()
    })
}

/// Check a plaintext password against a stored hash.
///
/// A malformed stored hash counts as a mismatch.
///
/// # Errors
///
/// Returns an internal error only if the blocking task is cancelled.
pub async fn verify_password(plain: String, hashed: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed).unwrap_or(false))
        .await
        .map_err(|err| {
            error!("Password verification task failed: {err}");
            ApiError::internal()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify_round_trip() {
        let hash = hash_password("hunter2-but-longer".to_string())
            .await
            .expect("hash");
        assert_ne!(hash, "hunter2-but-longer");

        let ok = verify_password("hunter2-but-longer".to_string(), hash.clone())
            .await
            .expect("verify");
        assert!(ok);

        let wrong = verify_password("wrong-password".to_string(), hash)
            .await
            .expect("verify");
        assert!(!wrong);
    }

    #[tokio::test]
    async fn malformed_hash_is_a_mismatch_not_an_error() {
        let ok = verify_password("anything".to_string(), "not-a-bcrypt-hash".to_string())
            .await
            .expect("verify");
        assert!(!ok);
    }

    #[tokio::test]
    async fn same_password_hashes_differently() {
        let first = hash_password("same-password".to_string()).await.expect("hash");
        let second = hash_password("same-password".to_string()).await.expect("hash");
        // Different salts
        assert_ne!(first, second);
    }
}
