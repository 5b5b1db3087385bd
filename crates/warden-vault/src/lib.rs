// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encrypted wallet store for the Warden custody framework.
//!
//! Each user's signing key is encrypted under a key derived from their
//! password via PBKDF2-HMAC-SHA256 and persisted as one small JSON record.
//! The binary layout inside a record (`salt || nonce || tag || ciphertext`)
//! is a storage contract: records written by any prior run must keep
//! decrypting, so the field widths and the KDF work factor are constants of
//! the format version, not configuration.

pub mod crypto;
pub mod format;
pub mod kdf;
pub mod store;

pub use format::EncryptedBlob;
pub use store::{WALLET_FORMAT_VERSION, WalletRecord, WalletStore};
