// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ed25519 signing keypair handling for the Warden custody framework.
//!
//! The vault stores private keys as hex strings; this crate owns the decode,
//! validation, and address-derivation logic around them. Signing itself is
//! performed by the external chain-call layer, not here.

pub mod keypair;

pub use keypair::SigningKeypair;
