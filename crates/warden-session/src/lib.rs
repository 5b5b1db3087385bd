// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory unlocked-session manager for the Warden custody framework.
//!
//! A session holds a decrypted signing key for a bounded TTL so signing
//! operations do not require the password on every call, while keeping the
//! plaintext exposure window short. Sessions never touch disk.

pub mod manager;

pub use manager::{SessionEvent, SessionManager, UnlockedKey};
