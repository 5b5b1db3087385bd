// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user session lifecycle: Locked -> Unlocked -> Locked.
//!
//! The session cache is a mutex-guarded map keyed by user id. Replacing a
//! session and cancelling its predecessor's expiry task happen inside one
//! critical section, and every expiry task carries the epoch of the session
//! it was spawned for: a timer left over from a replaced session finds a
//! different epoch in the map and must not evict anything.
//!
//! `get` and `lock` also check the deadline themselves rather than trusting
//! the scheduled eviction, so a not-yet-collected expired entry behaves as
//! absent.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use warden_config::SessionConfig;
use warden_core::{UserId, WardenError};
use warden_keys::SigningKeypair;
use warden_vault::WalletStore;
use zeroize::Zeroizing;

/// Capacity of the expiry notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Notification published when a session is evicted by its expiry task.
///
/// Explicit `lock` and session replacement are caller-initiated and do not
/// publish; only the unsolicited timeout does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Expired { user_id: UserId },
}

/// The decrypted material handed out for a signing operation.
///
/// The private key buffer zeroes itself on drop; callers must not stash it
/// beyond the operation at hand.
pub struct UnlockedKey {
    pub private_key: Zeroizing<String>,
    pub address: String,
}

/// A live unlocked session. Owns the only long-lived copy of the keypair.
struct Session {
    keypair: SigningKeypair,
    address: String,
    expires_at: Instant,
    /// Identifies this session instance to its own expiry task.
    epoch: u64,
    expiry_task: JoinHandle<()>,
}

/// Manages unlocked sessions on top of a [`WalletStore`].
pub struct SessionManager {
    store: Arc<WalletStore>,
    ttl: Duration,
    sessions: Arc<Mutex<HashMap<UserId, Session>>>,
    next_epoch: AtomicU64,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    /// Create a manager over the given store with the configured TTL.
    pub fn new(store: Arc<WalletStore>, config: &SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            ttl: Duration::from_secs(config.ttl_secs),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_epoch: AtomicU64::new(0),
            events,
        }
    }

    /// Subscribe to expiry notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Decrypt the user's wallet and install an unlocked session.
    ///
    /// Returns the wallet address. If a session already exists for this user
    /// its expiry task is cancelled and the session replaced, atomically with
    /// respect to the cache, so the old timer can never shorten the new
    /// session's lifetime. On store failure the error propagates unchanged
    /// and no session state is touched.
    pub async fn unlock(
        &self,
        user_id: UserId,
        password: &SecretString,
    ) -> Result<String, WardenError> {
        let keypair = self.store.load(user_id, password).await?;
        let address = keypair.address();

        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let expires_at = Instant::now() + self.ttl;

        let mut sessions = self.sessions.lock().await;
        if let Some(previous) = sessions.remove(&user_id) {
            previous.expiry_task.abort();
            debug!(user_id = %user_id, "replacing existing session");
        }
        let expiry_task = tokio::spawn(expire_after(
            Arc::clone(&self.sessions),
            self.events.clone(),
            user_id,
            epoch,
            self.ttl,
        ));
        sessions.insert(
            user_id,
            Session {
                keypair,
                address: address.clone(),
                expires_at,
                epoch,
                expiry_task,
            },
        );
        drop(sessions);

        info!(user_id = %user_id, ttl_secs = self.ttl.as_secs(), "session unlocked");
        Ok(address)
    }

    /// Retrieve the decrypted key for a signing operation.
    ///
    /// An entry past its deadline is treated as absent even if the expiry
    /// task has not collected it yet.
    pub async fn get(&self, user_id: UserId) -> Result<UnlockedKey, WardenError> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&user_id).ok_or(WardenError::NotUnlocked)?;
        if Instant::now() >= session.expires_at {
            return Err(WardenError::NotUnlocked);
        }
        Ok(UnlockedKey {
            private_key: session.keypair.private_key_hex(),
            address: session.address.clone(),
        })
    }

    /// Explicitly end a session, cancelling its expiry task.
    ///
    /// [`WardenError::AlreadyLocked`] if there is nothing live to lock,
    /// including an entry whose deadline already passed, which is discarded
    /// here but still reported as already locked.
    pub async fn lock(&self, user_id: UserId) -> Result<(), WardenError> {
        let mut sessions = self.sessions.lock().await;
        match sessions.remove(&user_id) {
            Some(session) => {
                session.expiry_task.abort();
                if Instant::now() >= session.expires_at {
                    return Err(WardenError::AlreadyLocked);
                }
                info!(user_id = %user_id, "session locked");
                Ok(())
            }
            None => Err(WardenError::AlreadyLocked),
        }
    }

    /// Drop every session and cancel every expiry task.
    ///
    /// Shutdown path: decrypted keys must not outlive the process's working
    /// state.
    pub async fn lock_all(&self) {
        let mut sessions = self.sessions.lock().await;
        for (user_id, session) in sessions.drain() {
            session.expiry_task.abort();
            debug!(user_id = %user_id, "session discarded on shutdown");
        }
    }
}

/// Expiry task body: evict the session after the TTL, unless a lock or a
/// newer unlock got there first.
async fn expire_after(
    sessions: Arc<Mutex<HashMap<UserId, Session>>>,
    events: broadcast::Sender<SessionEvent>,
    user_id: UserId,
    epoch: u64,
    ttl: Duration,
) {
    tokio::time::sleep(ttl).await;

    let mut sessions = sessions.lock().await;
    // Replaced or already locked: a stale timer evicts nothing.
    let is_current = sessions
        .get(&user_id)
        .is_some_and(|session| session.epoch == epoch);
    if is_current {
        sessions.remove(&user_id);
        info!(user_id = %user_id, "session expired");
        // Nobody listening is fine; the eviction already happened.
        let _ = events.send(SessionEvent::Expired { user_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};
    use warden_config::VaultConfig;

    const TTL_SECS: u64 = 300;

    fn password(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    async fn manager_with_wallet(user: UserId) -> (SessionManager, TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(WalletStore::new(&VaultConfig {
            wallet_dir: dir.path().to_path_buf(),
            min_password_length: 8,
        }));
        store.create(user, &password("correcthorse")).await.unwrap();
        let manager = SessionManager::new(store, &SessionConfig { ttl_secs: TTL_SECS });
        (manager, dir)
    }

    #[tokio::test]
    async fn unlock_then_get_returns_stable_material() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;

        let address = manager.unlock(user, &password("correcthorse")).await.unwrap();

        let first = manager.get(user).await.unwrap();
        let second = manager.get(user).await.unwrap();
        assert_eq!(first.address, address);
        assert_eq!(second.address, address);
        assert_eq!(*first.private_key, *second.private_key);
    }

    #[tokio::test]
    async fn unlock_with_wrong_password_creates_no_session() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;

        let result = manager.unlock(user, &password("wrongwrong")).await;
        assert!(matches!(result, Err(WardenError::AuthenticationFailed)));

        let get = manager.get(user).await;
        assert!(matches!(get, Err(WardenError::NotUnlocked)));
    }

    #[tokio::test]
    async fn wrong_password_leaves_existing_session_untouched() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;

        let address = manager.unlock(user, &password("correcthorse")).await.unwrap();

        let result = manager.unlock(user, &password("wrongwrong")).await;
        assert!(matches!(result, Err(WardenError::AuthenticationFailed)));

        // The prior session survives the failed attempt.
        let key = manager.get(user).await.unwrap();
        assert_eq!(key.address, address);
    }

    #[tokio::test]
    async fn lock_discards_the_session() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;

        manager.unlock(user, &password("correcthorse")).await.unwrap();
        manager.lock(user).await.unwrap();

        let get = manager.get(user).await;
        assert!(matches!(get, Err(WardenError::NotUnlocked)));
    }

    #[tokio::test]
    async fn lock_without_session_is_already_locked() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;

        let result = manager.lock(user).await;
        assert!(matches!(result, Err(WardenError::AlreadyLocked)));
    }

    #[tokio::test(start_paused = true)]
    async fn session_expires_after_ttl() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;

        manager.unlock(user, &password("correcthorse")).await.unwrap();

        tokio::time::advance(Duration::from_secs(TTL_SECS - 1)).await;
        assert!(manager.get(user).await.is_ok());

        tokio::time::advance(Duration::from_secs(2)).await;
        let get = manager.get(user).await;
        assert!(matches!(get, Err(WardenError::NotUnlocked)));

        // The expired session is gone for locking purposes too.
        let lock = manager.lock(user).await;
        assert!(matches!(lock, Err(WardenError::AlreadyLocked)));
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_publishes_an_event() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;
        let mut events = manager.subscribe();

        manager.unlock(user, &password("correcthorse")).await.unwrap();
        tokio::time::advance(Duration::from_secs(TTL_SECS + 1)).await;

        let event = events.recv().await.unwrap();
        assert_eq!(event, SessionEvent::Expired { user_id: user });
    }

    #[tokio::test(start_paused = true)]
    async fn re_unlock_resets_the_clock() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;

        manager.unlock(user, &password("correcthorse")).await.unwrap();
        tokio::time::advance(Duration::from_secs(TTL_SECS - 1)).await;

        // Re-unlock just before expiry; the first session's timer must not
        // fire against this replacement.
        manager.unlock(user, &password("correcthorse")).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        // Past the first session's deadline, the replacement is still live.
        assert!(manager.get(user).await.is_ok());

        tokio::time::advance(Duration::from_secs(TTL_SECS)).await;
        let get = manager.get(user).await;
        assert!(matches!(get, Err(WardenError::NotUnlocked)));
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_lock_cancels_the_expiry_task() {
        let user = UserId(42);
        let (manager, _dir) = manager_with_wallet(user).await;
        let mut events = manager.subscribe();

        manager.unlock(user, &password("correcthorse")).await.unwrap();
        manager.lock(user).await.unwrap();

        // Run well past the deadline: the cancelled timer must not publish.
        tokio::time::advance(Duration::from_secs(TTL_SECS * 2)).await;
        tokio::task::yield_now().await;
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn lock_all_discards_every_session() {
        let dir = tempdir().unwrap();
        let store = Arc::new(WalletStore::new(&VaultConfig {
            wallet_dir: dir.path().to_path_buf(),
            min_password_length: 8,
        }));
        store.create(UserId(1), &password("password-one")).await.unwrap();
        store.create(UserId(2), &password("password-two")).await.unwrap();
        let manager = SessionManager::new(store, &SessionConfig { ttl_secs: TTL_SECS });

        manager.unlock(UserId(1), &password("password-one")).await.unwrap();
        manager.unlock(UserId(2), &password("password-two")).await.unwrap();

        manager.lock_all().await;

        assert!(matches!(
            manager.get(UserId(1)).await,
            Err(WardenError::NotUnlocked)
        ));
        assert!(matches!(
            manager.get(UserId(2)).await,
            Err(WardenError::NotUnlocked)
        ));
    }

    #[tokio::test]
    async fn sessions_for_different_users_are_independent() {
        let dir = tempdir().unwrap();
        let store = Arc::new(WalletStore::new(&VaultConfig {
            wallet_dir: dir.path().to_path_buf(),
            min_password_length: 8,
        }));
        store.create(UserId(1), &password("password-one")).await.unwrap();
        store.create(UserId(2), &password("password-two")).await.unwrap();
        let manager = SessionManager::new(store, &SessionConfig { ttl_secs: TTL_SECS });

        manager.unlock(UserId(1), &password("password-one")).await.unwrap();
        manager.unlock(UserId(2), &password("password-two")).await.unwrap();

        manager.lock(UserId(1)).await.unwrap();

        assert!(matches!(
            manager.get(UserId(1)).await,
            Err(WardenError::NotUnlocked)
        ));
        assert!(manager.get(UserId(2)).await.is_ok());
    }

    /// The full command-layer flow: create, unlock, sign-time get, failed
    /// unlock, lock, locked-out get.
    #[tokio::test]
    async fn end_to_end_custody_flow() {
        let dir = tempdir().unwrap();
        let store = Arc::new(WalletStore::new(&VaultConfig {
            wallet_dir: dir.path().to_path_buf(),
            min_password_length: 8,
        }));
        let manager = SessionManager::new(Arc::clone(&store), &SessionConfig { ttl_secs: TTL_SECS });
        let user = UserId(42);

        let keypair = store.create(user, &password("correcthorse")).await.unwrap();
        let address = keypair.address();
        assert!(address.starts_with("0x"));

        let unlocked_address = manager.unlock(user, &password("correcthorse")).await.unwrap();
        assert_eq!(unlocked_address, address);

        let key = manager.get(user).await.unwrap();
        assert_eq!(*key.private_key, *keypair.private_key_hex());

        let bad = manager.unlock(user, &password("wrongpass")).await;
        assert!(matches!(bad, Err(WardenError::AuthenticationFailed)));
        assert!(manager.get(user).await.is_ok());

        manager.lock(user).await.unwrap();
        assert!(matches!(
            manager.get(user).await,
            Err(WardenError::NotUnlocked)
        ));
    }
}
