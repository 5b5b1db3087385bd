// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and non-zero durations.

use crate::model::WardenConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<String>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WardenConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.vault.wallet_dir.as_os_str().is_empty() {
        errors.push("vault.wallet_dir must not be empty".to_string());
    }

    if config.vault.min_password_length < 1 {
        errors.push(format!(
            "vault.min_password_length must be at least 1, got {}",
            config.vault.min_password_length
        ));
    }

    if config.session.ttl_secs < 1 {
        errors.push(format!(
            "session.ttl_secs must be at least 1, got {}",
            config.session.ttl_secs
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
