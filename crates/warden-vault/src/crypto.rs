// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open operations and the password-keyed blob pipeline.
//!
//! Every call to [`seal`] generates a fresh random nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security. The cipher is
//! parameterized with a 16-byte nonce because that is the width the stored
//! blob format carries.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aes::Aes256;
use aes_gcm::{AeadInPlace, AesGcm, KeyInit};
use rand::RngCore;
use rand::rngs::OsRng;
use warden_core::WardenError;
use zeroize::Zeroizing;

use crate::format::EncryptedBlob;
use crate::kdf::{self, KEY_LEN};

/// Nonce length in bytes, per the blob format.
pub const NONCE_LEN: usize = 16;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// AES-256-GCM with the 16-byte nonce the blob format stores.
type WalletCipher = AesGcm<Aes256, U16>;

/// Output of [`seal`]: ciphertext plus the per-encryption nonce and tag.
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

/// Encrypt plaintext with AES-256-GCM using a fresh random 16-byte nonce.
///
/// The tag is returned detached because the blob format stores it before the
/// ciphertext, not appended.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Sealed, WardenError> {
    let cipher = WalletCipher::new(GenericArray::from_slice(key));

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut ciphertext)
        .map_err(|_| WardenError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok(Sealed {
        nonce,
        tag: tag.into(),
        ciphertext,
    })
}

/// Decrypt ciphertext with AES-256-GCM, verifying the detached tag.
///
/// Returns the exact original plaintext, or [`WardenError::AuthenticationFailed`]
/// if the key is wrong or any byte of nonce, tag, or ciphertext was altered.
/// No partial results.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    tag: &[u8; TAG_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, WardenError> {
    let cipher = WalletCipher::new(GenericArray::from_slice(key));

    let mut plaintext = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            plaintext.as_mut_slice(),
            GenericArray::from_slice(tag),
        )
        .map_err(|_| WardenError::AuthenticationFailed)?;

    Ok(plaintext)
}

/// Encrypt plaintext under a password: fresh salt, derived key, fresh nonce,
/// serialized `salt || nonce || tag || ciphertext` blob.
pub fn encrypt_with_password(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>, WardenError> {
    let salt = kdf::generate_salt();
    let key = kdf::derive_key(password, &salt);
    let sealed = seal(&key, plaintext)?;

    Ok(EncryptedBlob {
        salt,
        nonce: sealed.nonce,
        tag: sealed.tag,
        ciphertext: sealed.ciphertext,
    }
    .encode())
}

/// Decrypt a blob produced by [`encrypt_with_password`].
///
/// Wrong password, tampered bytes, and truncated blobs all collapse into the
/// single [`WardenError::AuthenticationFailed`] outcome.
pub fn decrypt_with_password(
    blob: &[u8],
    password: &[u8],
) -> Result<Zeroizing<Vec<u8>>, WardenError> {
    let parsed = EncryptedBlob::decode(blob)?;
    let key = kdf::derive_key(password, &parsed.salt);
    open(&key, &parsed.nonce, &parsed.tag, &parsed.ciphertext)
}
