// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Warden custody framework.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides via the `WARDEN_` prefix.
//!
//! # Usage
//!
//! ```no_run
//! use warden_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("wallet dir: {}", config.vault.wallet_dir.display());
//! ```

pub mod loader;
pub mod model;
pub mod validation;

use warden_core::WardenError;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{SessionConfig, VaultConfig, WardenConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. Runs post-deserialization validation
pub fn load_and_validate() -> Result<WardenConfig, WardenError> {
    let config = loader::load_config().map_err(|e| WardenError::Config(e.to_string()))?;
    validation::validate_config(&config)
        .map_err(|messages| WardenError::Config(messages.join("; ")))?;
    Ok(config)
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<WardenConfig, WardenError> {
    let config =
        loader::load_config_from_str(toml_content).map_err(|e| WardenError::Config(e.to_string()))?;
    validation::validate_config(&config)
        .map_err(|messages| WardenError::Config(messages.join("; ")))?;
    Ok(config)
}
