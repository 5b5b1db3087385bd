// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a password.
//!
//! The iteration count is part of the record format (version "1.0"): records
//! written with one count are unreadable under another, so it lives here as a
//! constant shared by the encrypt and decrypt paths rather than in config.
//! Changing it requires a format version bump and migration logic.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

/// PBKDF2 iteration count baked into format version "1.0".
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes. One fresh salt per encryption, never reused.
pub const SALT_LEN: usize = 64;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Derive a 32-byte key from a password and salt.
///
/// Deterministic: the same password and salt always produce the same key.
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop. PBKDF2 itself cannot fail for these parameters, so no `Result`.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, key.as_mut());
    key
}

/// Generate a random 64-byte salt via the system CSPRNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [1u8; SALT_LEN];
        let key1 = derive_key(b"test password", &salt);
        let key2 = derive_key(b"test password", &salt);
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn different_passwords_produce_different_keys() {
        let salt = [2u8; SALT_LEN];
        let key1 = derive_key(b"password one", &salt);
        let key2 = derive_key(b"password two", &salt);
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn different_salts_produce_different_keys() {
        let key1 = derive_key(b"same password", &[1u8; SALT_LEN]);
        let key2 = derive_key(b"same password", &[2u8; SALT_LEN]);
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn generate_salt_produces_random_values() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn derived_key_is_32_bytes() {
        let key = derive_key(b"test", &[0u8; SALT_LEN]);
        assert_eq!(key.len(), KEY_LEN);
    }
}
