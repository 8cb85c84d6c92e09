//! One-way credential handling.
//!
//! The rest of the system treats credentials as an opaque verify-only
//! black box: plaintext goes in exactly twice (account creation and
//! login) and only the PHC hash string is ever stored.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;
use roadworks_core::{Error, Result};

/// Hash a plaintext password into an argon2 PHC string, e.g.
/// `$argon2id$v=19$…`.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Credential(e.to_string()))
}

/// Check a plaintext password against a stored PHC string.
///
/// Fails closed: a malformed stored hash verifies as false rather than
/// erroring.
pub fn verify_password(password: &str, credential_hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(credential_hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}
