// keyvault-core/src/crypto/key_deriver/mod.rs
//
// Key Derivation Engine - Multi-Curve Support
//
// Architecture:
// ┌─────────────────────────────────────────────────────────────┐
// │  Seed (64 bytes from BIP-39 Mnemonic)                       │
// │                        │                                    │
// │     ┌──────────────────┼──────────────────┐                 │
// │     ▼                  ▼                  ▼                 │
// │  secp256k1 (BIP-32)  ed25519 (SLIP-0010)  sr25519 (HDKD)    │
// │  ├─ EVM (ETH...)     └─ Solana            └─ Substrate      │
// │  └─ Bitcoin                                  (Polkadot...)  │
// └─────────────────────────────────────────────────────────────┘

pub mod ed25519;
pub mod secp256k1;
pub mod sr25519;

// Re-exports
pub use ed25519::Ed25519Deriver;
pub use secp256k1::Secp256k1Deriver;
pub use sr25519::Sr25519Deriver;

use crate::error::{CryptoError, WalletError, WalletResult};
use zeroize::Zeroizing;

// =============================================================================
// COMMON TYPES
// =============================================================================
/// Curve type for key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveType {
    /// secp256k1 — Bitcoin, Ethereum/EVM
    Secp256k1,
    /// Ed25519 — Solana
    Ed25519,
    /// Sr25519 (Schnorrkel/Ristretto) — Substrate chains
    Sr25519,
}

/// Derivation result: private key bytes + metadata
#[derive(Debug)]
pub struct DerivedKey {
    /// Private key bytes (32 bytes, auto-zeroize on drop).
    /// For sr25519 this is the mini secret key.
    pub private_key: Zeroizing<[u8; 32]>,
    /// Curve type
    pub curve: CurveType,
    /// Derivation path that produced this key
    pub path: String,
}

// =============================================================================
// UNIFIED DERIVER
// =============================================================================
/// Unified Key Deriver - entry point for every curve.
///
/// Dispatches to `Secp256k1Deriver` / `Ed25519Deriver` / `Sr25519Deriver`
/// based on the requested curve.
pub struct KeyDeriver;

impl KeyDeriver {
    /// Derive a key for the given curve.
    ///
    /// # Arguments
    /// * `seed` - BIP-39 seed (64 bytes)
    /// * `path` - Derivation path ("m/44'/60'/0'/0/0", "m/44'/501'/0'/0'",
    ///            or "//0" for Substrate)
    /// * `curve` - Curve type
    pub fn derive(seed: &[u8], path: &str, curve: CurveType) -> WalletResult<DerivedKey> {
        Self::validate_seed(seed)?;

        let private_key = match curve {
            CurveType::Secp256k1 => Secp256k1Deriver::derive(seed, path)?,
            CurveType::Ed25519 => Ed25519Deriver::derive(seed, path)?,
            CurveType::Sr25519 => Sr25519Deriver::derive(seed, path)?,
        };

        Ok(DerivedKey {
            private_key,
            curve,
            path: path.to_string(),
        })
    }

    /// Derive several secp256k1 keys under one base path (batch fan-out).
    ///
    /// # Arguments
    /// * `seed` - BIP-39 seed (64 bytes)
    /// * `base_path` - Base path (e.g., "m/44'/60'/0'/0")
    /// * `indices` - Range of indices (e.g., 0..10)
    pub fn derive_batch_secp256k1(
        seed: &[u8],
        base_path: &str,
        indices: std::ops::Range<u32>,
    ) -> WalletResult<Vec<DerivedKey>> {
        Self::validate_seed(seed)?;

        let keys = Secp256k1Deriver::derive_batch(seed, base_path, indices.clone())?;
        Ok(keys
            .into_iter()
            .enumerate()
            .map(|(i, pk)| DerivedKey {
                private_key: pk,
                curve: CurveType::Secp256k1,
                path: format!("{}/{}", base_path, indices.start + i as u32),
            })
            .collect())
    }

    /// Validate seed length
    #[inline]
    fn validate_seed(seed: &[u8]) -> WalletResult<()> {
        if seed.len() != 64 {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Invalid seed length: expected 64 bytes, got {}",
                seed.len()
            ))));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::paths::DerivationPaths;

    const TEST_SEED: &str = "16270f7b026afe7a3746efbfcf43e083500951db9e2699d1e4f372515dabcc80459b9181c3937b5faa4b8f7602f886553d2c32c5f12f3331cef40153aead4de6";

    #[test]
    fn test_unified_secp256k1() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let key = KeyDeriver::derive(&seed, DerivationPaths::EVM_0, CurveType::Secp256k1).unwrap();
        assert_eq!(key.curve, CurveType::Secp256k1);
        assert_eq!(key.private_key.len(), 32);
    }

    #[test]
    fn test_unified_ed25519() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let key = KeyDeriver::derive(&seed, DerivationPaths::SOLANA_0, CurveType::Ed25519).unwrap();
        assert_eq!(key.curve, CurveType::Ed25519);
        assert_eq!(key.private_key.len(), 32);
    }

    #[test]
    fn test_unified_sr25519() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let key =
            KeyDeriver::derive(&seed, DerivationPaths::SUBSTRATE_0, CurveType::Sr25519).unwrap();
        assert_eq!(key.curve, CurveType::Sr25519);
        assert_eq!(key.private_key.len(), 32);
    }

    #[test]
    fn test_invalid_seed() {
        let bad_seed = [0u8; 32];
        let result = KeyDeriver::derive(&bad_seed, "m/44'/60'/0'/0/0", CurveType::Secp256k1);
        assert!(result.is_err());
    }

    #[test]
    fn test_consistency() {
        let seed = hex::decode(TEST_SEED).unwrap();

        let k1 = KeyDeriver::derive(&seed, DerivationPaths::EVM_0, CurveType::Secp256k1).unwrap();
        let k2 = KeyDeriver::derive(&seed, DerivationPaths::EVM_0, CurveType::Secp256k1).unwrap();
        assert_eq!(&*k1.private_key, &*k2.private_key);

        let k3 = KeyDeriver::derive(&seed, DerivationPaths::SOLANA_0, CurveType::Ed25519).unwrap();
        let k4 = KeyDeriver::derive(&seed, DerivationPaths::SOLANA_0, CurveType::Ed25519).unwrap();
        assert_eq!(&*k3.private_key, &*k4.private_key);

        let k5 =
            KeyDeriver::derive(&seed, DerivationPaths::SUBSTRATE_0, CurveType::Sr25519).unwrap();
        let k6 =
            KeyDeriver::derive(&seed, DerivationPaths::SUBSTRATE_0, CurveType::Sr25519).unwrap();
        assert_eq!(&*k5.private_key, &*k6.private_key);
    }

    #[test]
    fn test_different_curves_produce_different_keys() {
        let seed = hex::decode(TEST_SEED).unwrap();
        // Same coin type but different curves must give different keys
        let secp = KeyDeriver::derive(&seed, "m/44'/60'/0'/0/0", CurveType::Secp256k1).unwrap();
        let ed = KeyDeriver::derive(&seed, "m/44'/60'/0'/0'", CurveType::Ed25519).unwrap();
        assert_ne!(&*secp.private_key, &*ed.private_key);
    }

    #[test]
    fn test_batch_fan_out() {
        let seed = hex::decode(TEST_SEED).unwrap();
        let keys = KeyDeriver::derive_batch_secp256k1(&seed, "m/44'/60'/0'/0", 0..3).unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[1].path, "m/44'/60'/0'/0/1");

        for (i, key) in keys.iter().enumerate() {
            let single = KeyDeriver::derive(
                &seed,
                &DerivationPaths::evm(i as u32),
                CurveType::Secp256k1,
            )
            .unwrap();
            assert_eq!(&*key.private_key, &*single.private_key);
        }
    }
}
