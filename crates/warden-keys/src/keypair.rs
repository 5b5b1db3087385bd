// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ed25519 signing keypair generation, hex decoding, and address derivation.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use warden_core::WardenError;
use zeroize::Zeroizing;

/// Length of a private key in hex digits (32 bytes).
const PRIVATE_KEY_HEX_LEN: usize = 64;

/// An Ed25519 signing keypair custodied by the vault.
///
/// Debug output intentionally omits the private key.
pub struct SigningKeypair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("address", &self.address())
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

impl SigningKeypair {
    /// Generate a new random Ed25519 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a keypair from private key bytes.
    pub fn from_bytes(private_bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(private_bytes);
        let verifying_key = VerifyingKey::from(&signing_key);
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Decode a keypair from a hex private key, with or without `0x` prefix.
    ///
    /// Anything that is not exactly 64 hex digits after prefix stripping is
    /// rejected with [`WardenError::InvalidCredentialFormat`].
    pub fn from_hex(raw: &str) -> Result<Self, WardenError> {
        let stripped = raw.trim().strip_prefix("0x").unwrap_or(raw.trim());
        if stripped.len() != PRIVATE_KEY_HEX_LEN {
            return Err(WardenError::InvalidCredentialFormat);
        }
        let decoded = Zeroizing::new(
            hex::decode(stripped).map_err(|_| WardenError::InvalidCredentialFormat)?,
        );
        let private_bytes: [u8; 32] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| WardenError::InvalidCredentialFormat)?;
        Ok(Self::from_bytes(&private_bytes))
    }

    /// Get the private key as a `0x`-prefixed hex string.
    ///
    /// This is the plaintext form the vault encrypts. The buffer is zeroed
    /// on drop.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("0x{}", hex::encode(self.signing_key.to_bytes())))
    }

    /// Get the public key bytes.
    pub fn public_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Derive the public address for this keypair.
    ///
    /// The address is `0x` followed by the last 20 bytes of the SHA-256
    /// digest of the public key, hex-encoded. Deterministic for a given
    /// private key, so callers can cache it alongside a session.
    pub fn address(&self) -> String {
        let digest = Sha256::digest(self.verifying_key.as_bytes());
        format!("0x{}", hex::encode(&digest[12..]))
    }
}
