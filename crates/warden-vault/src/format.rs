// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary layout of an encrypted key blob.
//!
//! A blob is the exact concatenation, in this order:
//!
//! ```text
//! salt (64 bytes) | nonce (16 bytes) | tag (16 bytes) | ciphertext (variable)
//! ```
//!
//! This module is the only code that knows the offsets. Records written by a
//! previous run must keep parsing, so the widths are fixed.

use warden_core::WardenError;

use crate::crypto::{NONCE_LEN, TAG_LEN};
use crate::kdf::SALT_LEN;

/// Combined length of the fixed-width fields preceding the ciphertext.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Parsed form of an encrypted key blob.
pub struct EncryptedBlob {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Serialize to the on-disk byte ordering.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse a blob back into its fields.
    ///
    /// A blob too short to contain the fixed-width header is corrupted data
    /// and reports the same merged [`WardenError::AuthenticationFailed`]
    /// outcome as a failed tag check. Fail closed.
    pub fn decode(bytes: &[u8]) -> Result<Self, WardenError> {
        if bytes.len() < HEADER_LEN {
            return Err(WardenError::AuthenticationFailed);
        }

        let (salt, rest) = bytes.split_at(SALT_LEN);
        let (nonce, rest) = rest.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        // The splits above are exact, so these conversions cannot fail.
        Ok(Self {
            salt: salt.try_into().map_err(|_| WardenError::AuthenticationFailed)?,
            nonce: nonce.try_into().map_err(|_| WardenError::AuthenticationFailed)?,
            tag: tag.try_into().map_err(|_| WardenError::AuthenticationFailed)?,
            ciphertext: ciphertext.to_vec(),
        })
    }
}
