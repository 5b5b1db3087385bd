// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Warden custody framework.
//!
//! This crate provides the error taxonomy and common identifier types
//! shared by the vault, session, and configuration crates.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WardenError;
pub use types::UserId;
