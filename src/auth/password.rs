use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::errors::ServiceError;

/// Hashes a password into an argon2 PHC string. Runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::HashError(e.to_string()))
    })
    .await
    .map_err(|e| ServiceError::InternalError(format!("hashing task failed: {}", e)))?
}

/// Checks a password against a stored PHC string. A malformed hash counts as a mismatch.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(&stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| ServiceError::InternalError(format!("verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("Demo1234!".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Demo1234!".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("demo1234!".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_never_matches() {
        assert!(!verify_password("anything".to_string(), "plain-text".to_string())
            .await
            .unwrap());
    }
}
