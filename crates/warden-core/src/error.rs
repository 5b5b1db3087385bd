// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Warden custody framework.

use thiserror::Error;

/// The primary error type used across the vault and session crates.
///
/// Every operation reports its outcome through a distinct variant; nothing is
/// swallowed. [`WardenError::AuthenticationFailed`] is the one deliberate
/// exception to specificity: a wrong password, a flipped ciphertext bit, and
/// a corrupted record all surface the same fixed message, so a caller (or an
/// attacker driving one) cannot tell which occurred.
#[derive(Debug, Error)]
pub enum WardenError {
    /// A wallet record already exists for this user.
    #[error("a wallet already exists for this user")]
    AlreadyExists,

    /// No wallet record exists for this user.
    #[error("no wallet found for this user")]
    NotFound,

    /// Password rejected by the minimum-length policy.
    #[error("password too weak: at least {min} characters required")]
    WeakPassword { min: usize },

    /// Supplied secret does not decode to a valid keypair.
    #[error("invalid private key format")]
    InvalidCredentialFormat,

    /// Decryption failed. Wrong password and tampered or corrupted record
    /// data are indistinguishable here.
    #[error("authentication failed: wrong password or corrupted wallet record")]
    AuthenticationFailed,

    /// No live session for this user.
    #[error("no unlocked session for this user")]
    NotUnlocked,

    /// The session is already locked.
    #[error("session is already locked")]
    AlreadyLocked,

    /// Underlying storage unavailable or failing.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (invalid TOML, missing fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
