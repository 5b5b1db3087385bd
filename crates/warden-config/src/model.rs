// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the Warden custody framework.
//!
//! All sections use `deny_unknown_fields` so typos fail loudly instead of
//! being silently ignored. Key-derivation work factors are deliberately NOT
//! configurable: they are constants of the on-disk record format, not
//! deployment tuning knobs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the Warden custody framework.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Encrypted wallet store settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Unlocked-session settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Encrypted wallet store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Directory holding one encrypted record per user (default: `.wallets`).
    #[serde(default = "default_wallet_dir")]
    pub wallet_dir: PathBuf,

    /// Minimum accepted password length (default: 8).
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            wallet_dir: default_wallet_dir(),
            min_password_length: default_min_password_length(),
        }
    }
}

fn default_wallet_dir() -> PathBuf {
    PathBuf::from(".wallets")
}

fn default_min_password_length() -> usize {
    8
}

/// Unlocked-session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// How long an unlocked session stays live without relocking (default: 300).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = WardenConfig::default();
        assert_eq!(config.vault.wallet_dir, PathBuf::from(".wallets"));
        assert_eq!(config.vault.min_password_length, 8);
        assert_eq!(config.session.ttl_secs, 300);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: WardenConfig = toml::from_str("").unwrap();
        assert_eq!(config.session.ttl_secs, 300);
        assert_eq!(config.vault.min_password_length, 8);
    }

    #[test]
    fn sections_deserialize() {
        let toml_str = r#"
[vault]
wallet_dir = "/var/lib/warden/wallets"
min_password_length = 12

[session]
ttl_secs = 60
"#;
        let config: WardenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.vault.wallet_dir,
            PathBuf::from("/var/lib/warden/wallets")
        );
        assert_eq!(config.vault.min_password_length, 12);
        assert_eq!(config.session.ttl_secs, 60);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = toml::from_str::<WardenConfig>("[vault]\nkdf_iterations = 5\n");
        // KDF parameters are format constants, not config.
        assert!(result.is_err());
    }

    #[test]
    fn unknown_top_level_section_is_rejected() {
        let result = toml::from_str::<WardenConfig>("[telegram]\nbot_token = \"x\"\n");
        assert!(result.is_err());
    }
}
