//! Refresh secret hashing.
//!
//! Sessions persist only a PHC-formatted Argon2id hash of their refresh
//! secret. Each hash carries its own random salt, so two sessions holding the
//! same plaintext (which the generator never produces) still hash differently.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hashes a refresh secret for storage.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails.
///
/// # Example
///
/// ```
/// use keyward_auth::secret::{hash_refresh_secret, verify_refresh_secret};
///
/// let hash = hash_refresh_secret("c2VjcmV0").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_refresh_secret("c2VjcmV0", &hash).unwrap());
/// ```
pub fn hash_refresh_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a presented refresh secret against a stored hash.
///
/// Returns `Ok(false)` on mismatch. An error means the stored hash itself is
/// unreadable.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if `hash` is not a valid PHC string.
pub fn verify_refresh_secret(secret: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}
