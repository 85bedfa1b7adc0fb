// keyvault-core/src/keyring.rs
//
// Keyring - Lock/Unlock State Machine & Signing Dispatch
//
// The keyring is the sole owner of live secrets. The mnemonic and seed
// exist in memory only while Unlocked; lock() re-seals the vault and wipes
// them. Unlock attempts are padded to a minimum duration so response
// latency reveals nothing about why an attempt failed.

use crate::accounts::{Account, AccountId, AccountLedger};
use crate::chains::{AdapterRegistry, ChainFamily};
use crate::crypto::mnemonic::{WalletMnemonic, WordCount};
use crate::error::{KeyringError, WalletError, WalletResult};
use crate::storage::VaultStore;
use crate::vault::{EncryptedVault, DEFAULT_KDF_ITERATIONS};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Minimum wall-clock duration of an unlock attempt, success or failure.
pub const DEFAULT_UNLOCK_FLOOR: Duration = Duration::from_millis(100);

// =============================================================================
// STATE
// =============================================================================

/// Keyring lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyringState {
    /// No vault exists yet.
    Uninitialized,
    /// A vault exists; secrets are sealed and wiped from memory.
    Locked,
    /// Secrets are live in memory.
    Unlocked,
}

/// Live secret state, present only while Unlocked.
///
/// The vault key and salt are cached so `lock()` and account creation can
/// re-seal without the password. Reusing the AES-GCM key is safe because
/// every seal draws a fresh nonce.
struct UnlockedSecrets {
    mnemonic: WalletMnemonic,
    seed: Zeroizing<[u8; 64]>,
    vault_key: Zeroizing<[u8; 32]>,
    salt: Vec<u8>,
    iterations: u32,
}

/// What the vault seals: the recovery phrase plus the account ledger.
///
/// Account metadata is public on its own, but sealing it alongside the
/// phrase keeps the vault the single source of truth across lock cycles.
#[derive(Serialize, Deserialize)]
struct VaultPayload {
    mnemonic: String,
    accounts: Vec<Account>,
}

// =============================================================================
// KEYRING
// =============================================================================

/// Multi-chain HD keyring over a [`VaultStore`] backend.
///
/// # Concurrency
/// Single-writer by design: wrap the instance in whatever mutex/actor
/// boundary the embedding application uses. No operation does I/O beyond
/// the store; `unlock` is the only call with an intentional delay.
pub struct Keyring<S: VaultStore> {
    store: S,
    state: KeyringState,
    secrets: Option<UnlockedSecrets>,
    ledger: AccountLedger,
    adapters: AdapterRegistry,
    kdf_iterations: u32,
    unlock_floor: Duration,
}

impl<S: VaultStore> Keyring<S> {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Open a keyring over a store. Starts `Locked` if the store already
    /// holds a vault, `Uninitialized` otherwise.
    pub fn new(store: S) -> WalletResult<Self> {
        let state = if store.load()?.is_some() {
            KeyringState::Locked
        } else {
            KeyringState::Uninitialized
        };

        Ok(Self {
            store,
            state,
            secrets: None,
            ledger: AccountLedger::new(),
            adapters: AdapterRegistry::with_defaults(),
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            unlock_floor: DEFAULT_UNLOCK_FLOOR,
        })
    }

    /// Override the KDF iteration count for newly created vaults.
    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    /// Override the unlock padding floor.
    pub fn with_unlock_floor(mut self, floor: Duration) -> Self {
        self.unlock_floor = floor;
        self
    }

    /// Replace the adapter registry (e.g. different chain ids / prefixes).
    pub fn with_adapters(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = adapters;
        self
    }

    #[inline]
    pub fn state(&self) -> KeyringState {
        self.state
    }

    #[inline]
    pub fn is_unlocked(&self) -> bool {
        self.state == KeyringState::Unlocked
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Create the vault and transition to `Unlocked`.
    ///
    /// Generates a fresh 12-word mnemonic when `phrase` is `None`,
    /// otherwise validates and imports the given phrase. Returns the
    /// mnemonic so the caller can present it for backup.
    pub fn initialize(
        &mut self,
        password: &str,
        phrase: Option<&str>,
    ) -> WalletResult<WalletMnemonic> {
        if self.state != KeyringState::Uninitialized || self.store.load()?.is_some() {
            return Err(WalletError::Keyring(KeyringError::AlreadyInitialized));
        }

        let mnemonic = match phrase {
            Some(p) => WalletMnemonic::from_phrase(p)?,
            None => WalletMnemonic::generate(WordCount::Twelve),
        };
        let seed = mnemonic.to_seed(None);

        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        let vault_key = EncryptedVault::derive_key(password, &salt, self.kdf_iterations);

        self.secrets = Some(UnlockedSecrets {
            mnemonic: mnemonic.clone(),
            seed,
            vault_key,
            salt: salt.to_vec(),
            iterations: self.kdf_iterations,
        });
        self.ledger.clear();
        self.seal_and_save()?;
        self.state = KeyringState::Unlocked;

        info!(word_count = mnemonic.word_count(), "keyring initialized");
        Ok(mnemonic)
    }

    /// Seal current state and wipe in-memory secrets.
    ///
    /// No-op when already `Locked`; `NotInitialized` when no vault exists.
    /// Never panics.
    pub fn lock(&mut self) -> WalletResult<()> {
        match self.state {
            KeyringState::Uninitialized => {
                Err(WalletError::Keyring(KeyringError::NotInitialized))
            }
            KeyringState::Locked => Ok(()),
            KeyringState::Unlocked => {
                self.seal_and_save()?;
                // Dropping UnlockedSecrets zeroizes mnemonic, seed and key
                self.secrets = None;
                self.state = KeyringState::Locked;
                info!("keyring locked");
                Ok(())
            }
        }
    }

    /// Decrypt the vault and repopulate secrets and accounts.
    ///
    /// # Timing contract
    /// Every attempt, success or failure, takes at least the configured
    /// floor. Failures are a single opaque `UnlockFailed`: wrong password
    /// and corrupted vault are indistinguishable.
    pub fn unlock(&mut self, password: &str) -> WalletResult<()> {
        let started = Instant::now();
        let result = self.try_unlock(password);

        // Pad to the floor regardless of outcome
        let elapsed = started.elapsed();
        if elapsed < self.unlock_floor {
            std::thread::sleep(self.unlock_floor - elapsed);
        }

        if result.is_err() {
            warn!("unlock attempt failed");
        }
        result
    }

    fn try_unlock(&mut self, password: &str) -> WalletResult<()> {
        match self.state {
            KeyringState::Uninitialized => {
                return Err(WalletError::Keyring(KeyringError::NotInitialized))
            }
            KeyringState::Unlocked => {
                // Already unlocked, but the password must still be right:
                // confirming a wrong one would hand the caller a false
                // "password accepted" signal. Check against the cached key.
                let secrets = self
                    .secrets
                    .as_ref()
                    .expect("Unlocked state always carries secrets");
                let candidate =
                    EncryptedVault::derive_key(password, &secrets.salt, secrets.iterations);
                if *candidate == *secrets.vault_key {
                    return Ok(());
                }
                return Err(WalletError::Keyring(KeyringError::UnlockFailed));
            }
            KeyringState::Locked => {}
        }

        let blob = self
            .store
            .load()?
            .ok_or(WalletError::Keyring(KeyringError::NotInitialized))?;

        // From here on every failure collapses to the opaque UnlockFailed
        let opaque = || WalletError::Keyring(KeyringError::UnlockFailed);

        let vault = EncryptedVault::from_json(&blob).map_err(|_| opaque())?;
        let vault_key = EncryptedVault::derive_key(password, &vault.salt, vault.iterations);
        let plaintext = vault.open_with_key(&vault_key).map_err(|_| opaque())?;

        let payload: VaultPayload = serde_json::from_slice(&plaintext).map_err(|_| opaque())?;
        let mnemonic = WalletMnemonic::from_phrase(&payload.mnemonic).map_err(|_| opaque())?;
        let seed = mnemonic.to_seed(None);

        self.ledger.clear();
        for account in payload.accounts {
            self.ledger.insert(account).map_err(|_| opaque())?;
        }

        self.secrets = Some(UnlockedSecrets {
            mnemonic,
            seed,
            vault_key,
            salt: vault.salt.clone(),
            iterations: vault.iterations,
        });
        self.state = KeyringState::Unlocked;

        info!(accounts = self.ledger.len(), "keyring unlocked");
        Ok(())
    }

    /// Destroy all persisted and in-memory state. Always succeeds in
    /// reaching `Uninitialized`.
    pub fn reset(&mut self) -> WalletResult<()> {
        self.store.clear()?;
        self.secrets = None;
        self.ledger.clear();
        self.state = KeyringState::Uninitialized;
        info!("keyring reset");
        Ok(())
    }

    /// The recovery phrase, for backup display. Requires `Unlocked`.
    pub fn reveal_mnemonic(&self) -> WalletResult<&WalletMnemonic> {
        Ok(&self.require_unlocked()?.mnemonic)
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// Derive and register an account. Requires `Unlocked`.
    ///
    /// With `index: None` the next free index for the family is used.
    /// An explicit index at or past the counter advances the counter past
    /// it, so auto-increment never reuses it.
    pub fn create_account(
        &mut self,
        family: ChainFamily,
        index: Option<u32>,
        name: Option<String>,
    ) -> WalletResult<Account> {
        self.require_unlocked()?;
        let index = index.unwrap_or_else(|| self.ledger.next_index(family));

        let adapter = self.adapters.get(family)?;
        let secrets = self.secrets.as_ref().expect("checked unlocked above");
        let handle = adapter.derive(&secrets.seed[..], index)?;

        let account = Account {
            id: AccountId::new(),
            family,
            index,
            path: handle.path.clone(),
            address: adapter.address(&handle)?,
            public_key: hex::encode(adapter.public_key(&handle)?),
            name,
        };

        self.ledger.insert(account.clone())?;
        // Persist the extended ledger inside the vault
        self.seal_and_save()?;

        info!(%family, index, address = %account.address, "account created");
        Ok(account)
    }

    /// Accounts, optionally filtered by family. Readable in any state —
    /// metadata is not secret. Empty when nothing matches.
    pub fn list_accounts(&self, family: Option<ChainFamily>) -> Vec<Account> {
        match family {
            Some(f) => self.ledger.list_by_family(f).into_iter().cloned().collect(),
            None => self.ledger.list().to_vec(),
        }
    }

    /// Look up by id. Readable in any state.
    pub fn get_account(&self, id: AccountId) -> Option<Account> {
        self.ledger.get(id).cloned()
    }

    /// Reverse lookup by address. Absence is normal, not an error.
    pub fn find_by_address(&self, address: &str) -> Option<Account> {
        self.ledger.find_by_address(address).cloned()
    }

    // =========================================================================
    // SIGNING DISPATCH
    // =========================================================================

    /// Sign a message with the account's key, per its family's convention.
    /// Requires `Unlocked`.
    pub fn sign_message(&self, account_id: AccountId, message: &[u8]) -> WalletResult<Vec<u8>> {
        let (adapter, handle) = self.handle_for(account_id)?;
        adapter.sign_message(&handle, message)
    }

    /// Sign a transaction payload, returning the family's broadcast
    /// artifact. Requires `Unlocked`.
    pub fn sign_transaction(
        &self,
        account_id: AccountId,
        payload: &[u8],
    ) -> WalletResult<Vec<u8>> {
        let (adapter, handle) = self.handle_for(account_id)?;
        adapter.sign_transaction(&handle, payload)
    }

    /// Re-derive the short-lived key handle for an account.
    fn handle_for(
        &self,
        account_id: AccountId,
    ) -> WalletResult<(&dyn crate::chains::ChainKeyAdapter, crate::chains::ChainKeyHandle)> {
        let secrets = self.require_unlocked()?;
        let account = self
            .ledger
            .get(account_id)
            .ok_or_else(|| {
                WalletError::Keyring(KeyringError::AccountNotFound(account_id.to_string()))
            })?;

        let adapter = self.adapters.get(account.family)?;
        let handle = adapter.derive(&secrets.seed[..], account.index)?;
        Ok((adapter, handle))
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn require_unlocked(&self) -> WalletResult<&UnlockedSecrets> {
        match self.state {
            KeyringState::Uninitialized => {
                Err(WalletError::Keyring(KeyringError::NotInitialized))
            }
            KeyringState::Locked => Err(WalletError::Keyring(KeyringError::Locked)),
            KeyringState::Unlocked => Ok(self
                .secrets
                .as_ref()
                .expect("Unlocked state always carries secrets")),
        }
    }

    /// Seal {mnemonic, accounts} with the cached vault key and persist.
    fn seal_and_save(&mut self) -> WalletResult<()> {
        let secrets = self
            .secrets
            .as_ref()
            .expect("seal_and_save requires live secrets");

        let payload = VaultPayload {
            mnemonic: secrets.mnemonic.phrase().to_string(),
            accounts: self.ledger.list().to_vec(),
        };
        let plaintext = Zeroizing::new(
            serde_json::to_vec(&payload)
                .map_err(|e| WalletError::Validation(e.to_string()))?,
        );

        let vault = EncryptedVault::seal_with_key(
            &plaintext,
            &secrets.vault_key,
            &secrets.salt,
            secrets.iterations,
        )?;
        self.store.save(&vault.to_json()?)
    }

    /// Test hook: whether all secret material has been dropped.
    #[cfg(test)]
    fn secrets_wiped(&self) -> bool {
        self.secrets.is_none()
    }
}

// Custom Debug - NEVER display secret state
impl<S: VaultStore> std::fmt::Debug for Keyring<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyring")
            .field("state", &self.state)
            .field("accounts", &self.ledger.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================
