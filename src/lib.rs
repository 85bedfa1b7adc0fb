// keyvault-core/src/lib.rs

//! # keyvault-core
//!
//! Multi-chain HD keyring with an encrypted vault.
//!
//! One BIP-39 recovery phrase deterministically derives independent key
//! material for four chain families — EVM (secp256k1), Bitcoin (secp256k1),
//! Solana (ed25519) and Substrate (sr25519) — behind a uniform account
//! model. Secrets live in memory only while the keyring is unlocked; at
//! rest they sit in a PBKDF2 + AES-256-GCM vault.
//!
//! ## Layers
//! - [`crypto`] — mnemonic lifecycle, derivation-path policy, per-curve
//!   key derivers
//! - [`chains`] — the [`ChainKeyAdapter`](chains::ChainKeyAdapter) seam:
//!   addresses, public keys and signing per family
//! - [`accounts`] — the public-metadata ledger
//! - [`vault`] / [`storage`] — the sealed envelope and where it persists
//! - [`keyring`] — the lock/unlock state machine and signing dispatcher
//!
//! ## Example
//! ```no_run
//! use keyvault_core::chains::ChainFamily;
//! use keyvault_core::keyring::Keyring;
//! use keyvault_core::storage::MemoryStore;
//!
//! # fn main() -> keyvault_core::error::WalletResult<()> {
//! let mut keyring = Keyring::new(MemoryStore::new())?;
//! let mnemonic = keyring.initialize("correct horse battery staple", None)?;
//! println!("back this up: {}", mnemonic.phrase());
//!
//! let account = keyring.create_account(ChainFamily::Evm, None, None)?;
//! let signature = keyring.sign_message(account.id, b"gm")?;
//!
//! keyring.lock()?;
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod chains;
pub mod crypto;
pub mod error;
pub mod keyring;
pub mod storage;
pub mod vault;

// Re-exports for cleaner API access
pub use accounts::{Account, AccountId, AccountLedger};
pub use chains::{AdapterRegistry, ChainFamily, ChainKeyAdapter, ChainKeyHandle};
pub use crypto::{CurveType, DerivationPaths, KeyDeriver, WalletMnemonic, WordCount};
pub use error::{WalletError, WalletResult};
pub use keyring::{Keyring, KeyringState};
pub use storage::{FileStore, MemoryStore, VaultStore};
pub use vault::EncryptedVault;
