// keyvault-core/src/crypto/mod.rs

//! Core Cryptography Module
//!
//! This module implements the fundamental cryptographic operations for the keyring:
//!
//! - **Mnemonic Lifecycle**: BIP-39 compliant phrases (12-24 words) via [`WalletMnemonic`].
//! - **Key Derivation**: Unified interface for secp256k1 (Bitcoin/EVM), ed25519 (Solana)
//!   and sr25519 (Substrate) via [`KeyDeriver`].
//! - **Derivation Policy**: Canonical per-family paths and custom builders via [`DerivationPaths`].

pub mod key_deriver;
pub mod mnemonic;
pub mod paths;

// Re-exports for cleaner API access
pub use key_deriver::{CurveType, DerivedKey, KeyDeriver};
pub use mnemonic::{WalletMnemonic, WordCount};
pub use paths::DerivationPaths;
