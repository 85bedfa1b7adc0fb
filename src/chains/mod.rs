// keyvault-core/src/chains/mod.rs

//! Chain Adapter Layer
//!
//! Everything chain-specific lives behind [`ChainKeyAdapter`]. The keyring
//! core derives keys, holds accounts and dispatches signing requests without
//! ever branching on a chain name; adding a chain family means implementing
//! the trait and registering it, not editing the core.
//!
//! - **EVM** (secp256k1): EIP-55 addresses, EIP-191 personal sign, legacy tx
//! - **Bitcoin** (secp256k1): P2WPKH bech32 addresses, Bitcoin Signed Message
//! - **Solana** (ed25519): base58 addresses, raw ed25519 signing
//! - **Substrate** (sr25519): SS58 addresses, context-bound Schnorr signing

pub mod evm;
pub mod solana;
pub mod substrate;
pub mod utxo;

pub use evm::EvmAdapter;
pub use solana::SolanaAdapter;
pub use substrate::SubstrateAdapter;
pub use utxo::UtxoAdapter;

use crate::crypto::key_deriver::{CurveType, KeyDeriver};
use crate::crypto::paths::DerivationPaths;
use crate::error::{KeyringError, WalletError, WalletResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use zeroize::Zeroizing;

// =============================================================================
// CHAIN FAMILY
// =============================================================================
/// The chain families the keyring can derive for.
///
/// Closed set on purpose: account records persist this value, so adding a
/// variant is a data-format decision, not just a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Ethereum and EVM-compatible chains (secp256k1)
    Evm,
    /// Bitcoin (secp256k1, Native SegWit)
    Bitcoin,
    /// Solana (ed25519)
    Solana,
    /// Polkadot/Kusama and other Substrate chains (sr25519)
    Substrate,
}

impl ChainFamily {
    /// All supported families, in registry order.
    pub const ALL: [ChainFamily; 4] = [
        ChainFamily::Evm,
        ChainFamily::Bitcoin,
        ChainFamily::Solana,
        ChainFamily::Substrate,
    ];

    /// The curve this family signs with.
    #[inline]
    pub const fn curve(self) -> CurveType {
        match self {
            ChainFamily::Evm | ChainFamily::Bitcoin => CurveType::Secp256k1,
            ChainFamily::Solana => CurveType::Ed25519,
            ChainFamily::Substrate => CurveType::Sr25519,
        }
    }
}

impl std::fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Bitcoin => "bitcoin",
            ChainFamily::Solana => "solana",
            ChainFamily::Substrate => "substrate",
        };
        f.write_str(name)
    }
}

// =============================================================================
// CHAIN KEY HANDLE
// =============================================================================
/// A derived private key bound to its family and path.
///
/// Handles are short-lived: the keyring derives one per operation and drops
/// it as soon as the adapter call returns. The key bytes zeroize on drop.
pub struct ChainKeyHandle {
    pub family: ChainFamily,
    pub private_key: Zeroizing<[u8; 32]>,
    pub path: String,
}

// Custom Debug - NEVER display the private key
impl std::fmt::Debug for ChainKeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainKeyHandle")
            .field("family", &self.family)
            .field("path", &self.path)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// CHAIN KEY ADAPTER TRAIT
// =============================================================================
/// The seam between the keyring core and chain-specific cryptography.
///
/// Implementations must be stateless with respect to key material: a handle
/// goes in, bytes come out, nothing is retained.
pub trait ChainKeyAdapter: Send + Sync {
    /// The family this adapter serves.
    fn family(&self) -> ChainFamily;

    /// Derive the key handle for `(family, index)` from a 64-byte seed.
    ///
    /// The default walks the canonical derivation policy; adapters only
    /// override this if their family needs something unusual.
    fn derive(&self, seed: &[u8], index: u32) -> WalletResult<ChainKeyHandle> {
        let family = self.family();
        let path = DerivationPaths::for_family(family, index);
        let derived = KeyDeriver::derive(seed, &path, family.curve())?;
        Ok(ChainKeyHandle {
            family,
            private_key: derived.private_key,
            path,
        })
    }

    /// Canonical address string for this handle's key.
    fn address(&self, handle: &ChainKeyHandle) -> WalletResult<String>;

    /// Public key bytes in the family's conventional encoding.
    fn public_key(&self, handle: &ChainKeyHandle) -> WalletResult<Vec<u8>>;

    /// Sign an arbitrary message per the family's message-signing convention.
    fn sign_message(&self, handle: &ChainKeyHandle, message: &[u8]) -> WalletResult<Vec<u8>>;

    /// Sign a transaction payload, returning the broadcast-ready artifact.
    fn sign_transaction(&self, handle: &ChainKeyHandle, payload: &[u8]) -> WalletResult<Vec<u8>>;
}

// =============================================================================
// ADAPTER REGISTRY
// =============================================================================
/// Registry mapping each [`ChainFamily`] to its adapter.
pub struct AdapterRegistry {
    adapters: HashMap<ChainFamily, Box<dyn ChainKeyAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry (no families supported).
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry with all four built-in adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(EvmAdapter::default()));
        registry.register(Box::new(UtxoAdapter::default()));
        registry.register(Box::new(SolanaAdapter::default()));
        registry.register(Box::new(SubstrateAdapter::default()));
        registry
    }

    /// Register (or replace) the adapter for its family.
    pub fn register(&mut self, adapter: Box<dyn ChainKeyAdapter>) {
        self.adapters.insert(adapter.family(), adapter);
    }

    /// Look up the adapter for a family.
    pub fn get(&self, family: ChainFamily) -> WalletResult<&dyn ChainKeyAdapter> {
        self.adapters
            .get(&family)
            .map(|a| a.as_ref())
            .ok_or(WalletError::Keyring(KeyringError::UnsupportedChainFamily(
                family,
            )))
    }

    /// Families with a registered adapter.
    pub fn families(&self) -> Vec<ChainFamily> {
        self.adapters.keys().copied().collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SEED: &str = "16270f7b026afe7a3746efbfcf43e083500951db9e2699d1e4f372515dabcc80459b9181c3937b5faa4b8f7602f886553d2c32c5f12f3331cef40153aead4de6";

    #[test]
    fn test_family_display() {
        assert_eq!(ChainFamily::Evm.to_string(), "evm");
        assert_eq!(ChainFamily::Substrate.to_string(), "substrate");
    }

    #[test]
    fn test_family_serde_round_trip() {
        for family in ChainFamily::ALL {
            let json = serde_json::to_string(&family).unwrap();
            let back: ChainFamily = serde_json::from_str(&json).unwrap();
            assert_eq!(family, back);
        }
        assert_eq!(serde_json::to_string(&ChainFamily::Bitcoin).unwrap(), "\"bitcoin\"");
    }

    #[test]
    fn test_registry_with_defaults_covers_all_families() {
        let registry = AdapterRegistry::with_defaults();
        for family in ChainFamily::ALL {
            let adapter = registry.get(family).unwrap();
            assert_eq!(adapter.family(), family);
        }
    }

    #[test]
    fn test_empty_registry_rejects() {
        let registry = AdapterRegistry::new();
        let result = registry.get(ChainFamily::Evm);
        assert!(matches!(
            result,
            Err(WalletError::Keyring(KeyringError::UnsupportedChainFamily(
                ChainFamily::Evm
            )))
        ));
    }

    #[test]
    fn test_default_derive_follows_policy() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let registry = AdapterRegistry::with_defaults();

        for family in ChainFamily::ALL {
            let adapter = registry.get(family).unwrap();
            let handle = adapter.derive(&seed, 3).unwrap();
            assert_eq!(handle.family, family);
            assert_eq!(handle.path, DerivationPaths::for_family(family, 3));
        }
    }

    #[test]
    fn test_handle_debug_does_not_leak_key() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let registry = AdapterRegistry::with_defaults();
        let handle = registry
            .get(ChainFamily::Evm)
            .unwrap()
            .derive(&seed, 0)
            .unwrap();

        let debug_output = format!("{:?}", handle);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&hex::encode(&*handle.private_key)));
    }
}
