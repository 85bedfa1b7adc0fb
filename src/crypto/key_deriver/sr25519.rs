// keyvault-core/src/crypto/key_deriver/sr25519.rs
//
// Sr25519 Key Derivation — Substrate HDKD
//
// Used by: Polkadot, Kusama and other Substrate chains
// Algorithm: Schnorrkel hard key derivation over Ristretto255
// Reference: https://wiki.polkadot.network/docs/learn-accounts#derivation-paths
//
// Substrate does NOT use BIP-32 paths. Accounts hang off the root mini
// secret via hard junctions written as "//index" in the derivation URI.

use crate::error::{CryptoError, WalletError, WalletResult};
use schnorrkel::derive::ChainCode;
use schnorrkel::{ExpansionMode, MiniSecretKey};
use zeroize::Zeroizing;

/// Sr25519 Key Deriver — Substrate HDKD
///
/// # Differences from BIP-32 / SLIP-0010
/// - The root key is a 32-byte mini secret taken from the first half of the
///   64-byte BIP-39 seed
/// - Junctions are hard only (`//n`); soft junctions (`/n`) are rejected
/// - Each junction index is SCALE-encoded (u64 little-endian) into a 32-byte
///   chain code, matching Substrate's numeric `DeriveJunction`
///
/// # Security
/// - The mini secret is returned in `Zeroizing<[u8; 32]>`
/// - Hard derivation: a child key never reveals its parent
pub struct Sr25519Deriver;

impl Sr25519Deriver {
    /// Derive a mini secret key from seed + junction path.
    ///
    /// # Arguments
    /// * `seed` - 64-byte BIP-39 seed
    /// * `path` - Hard junction URI, e.g. "//0" or "//0//5"
    ///
    /// # Returns
    /// 32-byte sr25519 mini secret, auto-zeroize on drop
    pub fn derive(seed: &[u8], path: &str) -> WalletResult<Zeroizing<[u8; 32]>> {
        if seed.len() < 32 {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Seed too short for sr25519: need at least 32 bytes, got {}",
                seed.len()
            ))));
        }

        let junctions = Self::parse_path(path)?;

        let mut mini = MiniSecretKey::from_bytes(&seed[..32]).map_err(|e| {
            WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Invalid mini secret: {}",
                e
            )))
        })?;

        for index in junctions {
            let (child, _cc) = mini.hard_derive_mini_secret_key(
                Some(Self::junction_chain_code(index)),
                b"",
                ExpansionMode::Ed25519,
            );
            mini = child;
        }

        Ok(Zeroizing::new(mini.to_bytes()))
    }

    /// Chain code for a numeric hard junction.
    ///
    /// Substrate SCALE-encodes the index (u64, little-endian) and zero-pads
    /// to 32 bytes.
    fn junction_chain_code(index: u32) -> ChainCode {
        let mut cc = [0u8; 32];
        cc[..8].copy_from_slice(&(index as u64).to_le_bytes());
        ChainCode(cc)
    }

    /// Parse a hard junction URI into its list of indices.
    ///
    /// Input: "//0//5"
    /// Output: [0, 5]
    ///
    /// Soft junctions ("/n") and anything not of the `//n` shape are
    /// rejected.
    fn parse_path(path: &str) -> WalletResult<Vec<u32>> {
        let path = path.trim();

        if !path.starts_with("//") {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                "Substrate path must start with '//': {}",
                path
            ))));
        }

        let mut indices = Vec::new();
        for segment in path.split("//").skip(1) {
            if segment.is_empty() || segment.contains('/') {
                return Err(WalletError::Crypto(CryptoError::DerivationFailed(format!(
                    "Invalid junction in '{}': only hard numeric junctions (//n) are supported",
                    path
                ))));
            }
            let index: u32 = segment.parse().map_err(|e| {
                WalletError::Crypto(CryptoError::DerivationFailed(format!(
                    "Invalid junction index '{}': {}",
                    segment, e
                )))
            })?;
            indices.push(index);
        }

        if indices.is_empty() {
            return Err(WalletError::Crypto(CryptoError::DerivationFailed(
                "Empty junction path".to_string(),
            )));
        }

        Ok(indices)
    }

    /// Validate a Substrate junction path.
    pub fn is_valid_path(path: &str) -> bool {
        Self::parse_path(path).is_ok()
    }
}

// =============================================================================
// TESTS
// =============================================================================
