//! Password hashing logic.
//!
//! Passwords are stored as a per-user random salt plus an HMAC-SHA256
//! digest of the plaintext keyed with that salt. Verification recomputes
//! the digest with the stored salt and compares hex strings.

use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

const SALT_LENGTH: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// Salt and digest pair as stored on a user record.
#[derive(Clone, Debug, PartialEq)]
pub struct PasswordHash {
    pub salt: String,
    pub digest: String,
}

/// Derive a fresh salt and digest from a plaintext password.
///
/// Runs only when the password field is being set or changed, never on
/// unrelated updates to the same record.
pub fn hash(plaintext: &str) -> PasswordHash {
    let mut bytes = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    let salt = hex::encode(bytes);
    let digest = digest_with_salt(&salt, plaintext);

    PasswordHash { salt, digest }
}

/// Check a candidate password against a stored salt and digest.
pub fn verify(plaintext: &str, salt: &str, digest: &str) -> bool {
    digest_with_salt(salt, plaintext) == digest
}

fn digest_with_salt(salt: &str, plaintext: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(plaintext.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_roundtrip() {
        let hashed = hash("secret1");

        assert_eq!(hashed.salt.len(), SALT_LENGTH * 2);
        assert!(hashed.salt.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(verify("secret1", &hashed.salt, &hashed.digest));
    }

    #[test]
    fn test_verify_rejects_other_password() {
        let hashed = hash("secret1");

        assert!(!verify("secret2", &hashed.salt, &hashed.digest));
        assert!(!verify("", &hashed.salt, &hashed.digest));
    }

    #[test]
    fn test_salt_is_unique_per_hash() {
        let first = hash("secret1");
        let second = hash("secret1");

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.digest, second.digest);
    }

    #[test]
    fn test_digest_depends_on_stored_salt() {
        let hashed = hash("secret1");
        let other_salt = hash("secret1").salt;

        // Recomputing with a different salt must not match.
        assert_ne!(digest_with_salt(&other_salt, "secret1"), hashed.digest);
    }
}
