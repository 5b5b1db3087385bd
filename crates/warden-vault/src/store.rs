// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wallet record lifecycle: create, import, load, and remove per-user
//! encrypted signing keys.
//!
//! One JSON document per user under the configured wallet directory. The
//! per-user file is the unit of isolation: operations on different users
//! never contend on a shared lock, and duplicate creation for one user is
//! settled by `create_new` open semantics at the filesystem.

use std::io::ErrorKind;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use warden_config::VaultConfig;
use warden_core::{UserId, WardenError};
use warden_keys::SigningKeypair;
use zeroize::Zeroizing;

use crate::crypto;

/// Record format tag. The KDF work factor is bound to this version; bumping
/// one requires bumping the other.
pub const WALLET_FORMAT_VERSION: &str = "1.0";

/// A persisted wallet record, one per user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    /// Format tag for forward compatibility.
    pub version: String,
    /// Owner of this record.
    pub user_id: UserId,
    /// Base64 of `salt || nonce || tag || ciphertext`.
    pub encrypted_key: String,
    /// Creation timestamp, informational only.
    pub created_at: DateTime<Utc>,
}

/// File-backed store of encrypted wallet records.
pub struct WalletStore {
    wallet_dir: PathBuf,
    min_password_len: usize,
}

impl WalletStore {
    /// Create a store over the configured wallet directory.
    ///
    /// The directory is created lazily on first write, not here.
    pub fn new(config: &VaultConfig) -> Self {
        Self {
            wallet_dir: config.wallet_dir.clone(),
            min_password_len: config.min_password_length,
        }
    }

    /// Check whether an encrypted record exists for this user.
    pub async fn exists(&self, user_id: UserId) -> Result<bool, WardenError> {
        Ok(tokio::fs::try_exists(self.wallet_path(user_id)).await?)
    }

    /// Create a wallet with a freshly generated signing key.
    ///
    /// Fails with [`WardenError::AlreadyExists`] if the user already has a
    /// record and [`WardenError::WeakPassword`] below the configured minimum
    /// length. Returns the keypair so the caller can show the new secret and
    /// address exactly once; the store keeps only the encrypted form.
    pub async fn create(
        &self,
        user_id: UserId,
        password: &SecretString,
    ) -> Result<SigningKeypair, WardenError> {
        self.check_password(password)?;
        if self.exists(user_id).await? {
            return Err(WardenError::AlreadyExists);
        }

        let keypair = SigningKeypair::generate();
        let encrypted_key = encrypt_secret(&keypair, password).await?;
        self.write_new_record(user_id, encrypted_key).await?;

        info!(user_id = %user_id, address = %keypair.address(), "wallet created");
        Ok(keypair)
    }

    /// Create a wallet from a caller-supplied private key.
    ///
    /// Same preconditions as [`create`](Self::create); additionally the
    /// secret must decode to a valid keypair
    /// ([`WardenError::InvalidCredentialFormat`] otherwise). The key is
    /// normalized to its `0x`-prefixed hex form before encryption. Returns
    /// the derived address.
    pub async fn import_key(
        &self,
        user_id: UserId,
        password: &SecretString,
        raw_secret: &str,
    ) -> Result<String, WardenError> {
        self.check_password(password)?;
        if self.exists(user_id).await? {
            return Err(WardenError::AlreadyExists);
        }

        let keypair = SigningKeypair::from_hex(raw_secret)?;
        let address = keypair.address();
        let encrypted_key = encrypt_secret(&keypair, password).await?;
        self.write_new_record(user_id, encrypted_key).await?;

        info!(user_id = %user_id, address = %address, "wallet imported");
        Ok(address)
    }

    /// Read and decrypt a user's wallet.
    ///
    /// [`WardenError::NotFound`] if no record exists. Everything that stands
    /// between a present record and a valid decrypted keypair (wrong
    /// password, flipped bits, an unparseable document, an unknown format
    /// version, plaintext that no longer decodes to a keypair) reports the
    /// single merged [`WardenError::AuthenticationFailed`] outcome.
    pub async fn load(
        &self,
        user_id: UserId,
        password: &SecretString,
    ) -> Result<SigningKeypair, WardenError> {
        let raw = match tokio::fs::read_to_string(self.wallet_path(user_id)).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(WardenError::NotFound),
            Err(e) => return Err(e.into()),
        };

        let record: WalletRecord =
            serde_json::from_str(&raw).map_err(|_| WardenError::AuthenticationFailed)?;
        if record.version != WALLET_FORMAT_VERSION {
            return Err(WardenError::AuthenticationFailed);
        }
        let blob = BASE64
            .decode(&record.encrypted_key)
            .map_err(|_| WardenError::AuthenticationFailed)?;

        let password_bytes = password_bytes(password);
        let plaintext = tokio::task::spawn_blocking(move || {
            crypto::decrypt_with_password(&blob, &password_bytes)
        })
        .await
        .map_err(|e| WardenError::Internal(format!("key derivation task failed: {e}")))??;

        // Re-validate the decrypted bytes against silent corruption.
        let hex_key =
            std::str::from_utf8(&plaintext).map_err(|_| WardenError::AuthenticationFailed)?;
        let keypair =
            SigningKeypair::from_hex(hex_key).map_err(|_| WardenError::AuthenticationFailed)?;

        debug!(user_id = %user_id, "wallet decrypted");
        Ok(keypair)
    }

    /// Delete a user's wallet record, authorizing with their password first.
    ///
    /// Behaves like [`load`](Self::load) up to the point of deletion: a
    /// missing record is [`WardenError::NotFound`], a wrong password is
    /// [`WardenError::AuthenticationFailed`] and leaves the record intact.
    pub async fn remove(&self, user_id: UserId, password: &SecretString) -> Result<(), WardenError> {
        self.load(user_id, password).await?;

        match tokio::fs::remove_file(self.wallet_path(user_id)).await {
            Ok(()) => {
                info!(user_id = %user_id, "wallet removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(WardenError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Path of the per-user record file.
    fn wallet_path(&self, user_id: UserId) -> PathBuf {
        self.wallet_dir.join(format!("{user_id}.wallet"))
    }

    fn check_password(&self, password: &SecretString) -> Result<(), WardenError> {
        if password.expose_secret().chars().count() < self.min_password_len {
            return Err(WardenError::WeakPassword {
                min: self.min_password_len,
            });
        }
        Ok(())
    }

    /// Persist a new record, failing if one already exists.
    ///
    /// `create_new` makes the existence check and the file creation one
    /// atomic filesystem operation, so two concurrent creates for the same
    /// user cannot both succeed.
    async fn write_new_record(
        &self,
        user_id: UserId,
        encrypted_key: String,
    ) -> Result<(), WardenError> {
        tokio::fs::create_dir_all(&self.wallet_dir).await?;

        let record = WalletRecord {
            version: WALLET_FORMAT_VERSION.to_string(),
            user_id,
            encrypted_key,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| WardenError::Internal(format!("record serialization failed: {e}")))?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.wallet_path(user_id))
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(WardenError::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Encrypt a keypair's private key hex under the password, off the async
/// threads (PBKDF2 is deliberately slow).
async fn encrypt_secret(
    keypair: &SigningKeypair,
    password: &SecretString,
) -> Result<String, WardenError> {
    let plaintext = keypair.private_key_hex();
    let password_bytes = password_bytes(password);
    let blob = tokio::task::spawn_blocking(move || {
        crypto::encrypt_with_password(plaintext.as_bytes(), &password_bytes)
    })
    .await
    .map_err(|e| WardenError::Internal(format!("key derivation task failed: {e}")))??;
    Ok(BASE64.encode(blob))
}

/// Copy password bytes into an owned zeroizing buffer for `spawn_blocking`.
fn password_bytes(password: &SecretString) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(password.expose_secret().as_bytes().to_vec())
}
