//! Password hashing.
//!
//! Stored form: `base64(salt)$base64(HMAC-SHA256(salt, password))`.

use base64::{engine::general_purpose::STANDARD_NO_PAD as BASE64, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use super::store::AccountError;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

/// Hashes and checks passwords. Implementations must be thread-safe.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AccountError>;

    /// `false` for a wrong password or an unreadable stored hash.
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Salted HMAC-SHA256 hasher with a fresh random salt per password.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256PasswordHasher;

impl Sha256PasswordHasher {
    fn mac(salt: &[u8], password: &str) -> Result<HmacSha256, AccountError> {
        let mut mac =
            HmacSha256::new_from_slice(salt).map_err(|e| AccountError::Hashing(e.to_string()))?;
        mac.update(password.as_bytes());
        Ok(mac)
    }
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, AccountError> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let digest = Self::mac(&salt, password)?.finalize().into_bytes();
        Ok(format!("{}${}", BASE64.encode(salt), BASE64.encode(digest)))
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((salt, digest)) = stored.split_once('$') else {
            return false;
        };
        let (Ok(salt), Ok(digest)) = (BASE64.decode(salt), BASE64.decode(digest)) else {
            return false;
        };
        match Self::mac(&salt, password) {
            Ok(mac) => mac.verify_slice(&digest).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = Sha256PasswordHasher;
        let stored = hasher.hash("hunter2").unwrap();
        assert!(hasher.verify("hunter2", &stored));
        assert!(!hasher.verify("hunter3", &stored));
        assert!(!hasher.verify("", &stored));
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let hasher = Sha256PasswordHasher;
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &a));
        assert!(hasher.verify("same", &b));
    }

    #[test]
    fn test_garbage_stored_hash_never_verifies() {
        let hasher = Sha256PasswordHasher;
        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "no-separator"));
        assert!(!hasher.verify("pw", "!!!$???"));
    }
}
