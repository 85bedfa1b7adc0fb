// keyvault-core/src/crypto/paths.rs
//
// Derivation Policy - Multi-Chain HD Wallet Path Generator
// BIP-44 (Purpose), SLIP-44 (Coin Types), BIP-84 (Bitcoin SegWit),
// SLIP-0010 (ed25519), Substrate junction URIs (sr25519)

use crate::chains::ChainFamily;

// =============================================================================
// SLIP-44 COIN TYPES
// =============================================================================
/// SLIP-44 Registered Coin Types
/// Ref: https://github.com/satoshilabs/slips/blob/master/slip-0044.md
pub mod coin_type {
    // ---- secp256k1 chains ----
    pub const BITCOIN: u32 = 0;
    pub const ETHEREUM: u32 = 60; // shared by every EVM-compatible chain

    // ---- ed25519 chains ----
    pub const SOLANA: u32 = 501;

    // ---- sr25519 chains (Substrate HDKD, not BIP-44) ----
    pub const POLKADOT: u32 = 354;
}

// =============================================================================
// DERIVATION PATHS
// =============================================================================
/// Canonical derivation paths per chain family.
///
/// # Conventions
/// - BIP-44:    `m/44'/coin'/account'/change/index` (EVM, secp256k1)
/// - BIP-84:    `m/84'/0'/account'/change/index` (Bitcoin Native SegWit)
/// - SLIP-0010: `m/44'/coin'/account'/change'` (ed25519, all hardened)
/// - Substrate: `//index` (sr25519 hard junction; Substrate chains do not
///   use BIP-44 at all)
pub struct DerivationPaths;

impl DerivationPaths {
    /// The canonical path for `(family, account_index)`.
    ///
    /// Total and pure: every input maps to exactly one path, and distinct
    /// `(family, index)` pairs never collide since each family owns its
    /// own path prefix. Consulted by account creation and by re-derivation
    /// after unlock, so it must never change shape for an existing family.
    pub fn for_family(family: ChainFamily, index: u32) -> String {
        match family {
            ChainFamily::Evm => Self::evm(index),
            ChainFamily::Bitcoin => Self::btc_native_segwit(0, index),
            ChainFamily::Solana => Self::solana(index),
            ChainFamily::Substrate => Self::substrate(index),
        }
    }

    // =========================================================================
    // EVM CHAINS (secp256k1) — BIP-44, coin_type = 60
    // Ethereum, BSC, Polygon, Arbitrum, Optimism, Avalanche, Base, zkSync...
    // =========================================================================
    pub const EVM_0: &'static str = "m/44'/60'/0'/0/0";

    /// EVM path with custom address index
    #[inline]
    pub fn evm(index: u32) -> String {
        format!("m/44'/60'/0'/0/{}", index)
    }

    // =========================================================================
    // BITCOIN (secp256k1) — BIP-84 Native SegWit (bc1q...)
    // =========================================================================
    pub const BTC_NATIVE_SEGWIT_0: &'static str = "m/84'/0'/0'/0/0";

    #[inline]
    pub fn btc_native_segwit(account: u32, index: u32) -> String {
        format!("m/84'/0'/{}'/0/{}", account, index)
    }

    // =========================================================================
    // SOLANA (ed25519) — SLIP-0010 (all levels hardened)
    // =========================================================================
    pub const SOLANA_0: &'static str = "m/44'/501'/0'/0'";

    /// Solana path with custom account index
    #[inline]
    pub fn solana(account: u32) -> String {
        Self::ed25519_path(coin_type::SOLANA, account, &[0])
    }

    // =========================================================================
    // SUBSTRATE (sr25519) — hard junction URI
    // Polkadot, Kusama and other Substrate chains use Schnorrkel HDKD with
    // `//n` hard junctions instead of BIP-32 paths.
    // =========================================================================
    pub const SUBSTRATE_0: &'static str = "//0";

    #[inline]
    pub fn substrate(index: u32) -> String {
        format!("//{}", index)
    }

    // =========================================================================
    // CUSTOM PATH BUILDERS
    // =========================================================================
    /// Build a custom BIP-44-style path (for secp256k1 chains).
    ///
    /// # Arguments
    /// * `purpose` - 44 (BIP-44), 84 (BIP-84 SegWit), 49 (BIP-49), 86 (BIP-86 Taproot)
    /// * `coin_type` - SLIP-44 coin type (use constants from `coin_type::*`)
    /// * `account` - Account index (usually 0)
    /// * `change` - 0 = external (receive), 1 = internal (change, Bitcoin only)
    /// * `index` - Address index
    #[inline]
    pub fn bip44(purpose: u32, coin_type: u32, account: u32, change: u32, index: u32) -> String {
        format!(
            "m/{}'/{}'/{}'/{}/{}",
            purpose, coin_type, account, change, index
        )
    }

    /// Build a SLIP-0010 path for ed25519 chains (always hardened).
    ///
    /// Every sub-index is forced hardened, which SLIP-0010 requires for
    /// ed25519.
    ///
    /// # Verify
    /// - Solana: `ed25519_path(501, 0, &[0])` -> m/44'/501'/0'/0'
    pub fn ed25519_path(coin_type: u32, account: u32, sub_paths: &[u32]) -> String {
        // Base: m/44'/coin_type'/account'
        let mut path = format!("m/44'/{}'/{}'", coin_type, account);

        // Append sub_paths, all hardened
        for &idx in sub_paths {
            path.push_str(&format!("/{}'", idx));
        }
        path
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evm_paths() {
        assert_eq!(DerivationPaths::EVM_0, "m/44'/60'/0'/0/0");
        assert_eq!(DerivationPaths::evm(0), "m/44'/60'/0'/0/0");
        assert_eq!(DerivationPaths::evm(5), "m/44'/60'/0'/0/5");
    }

    #[test]
    fn test_bitcoin_paths() {
        assert_eq!(DerivationPaths::BTC_NATIVE_SEGWIT_0, "m/84'/0'/0'/0/0");
        assert_eq!(DerivationPaths::btc_native_segwit(0, 1), "m/84'/0'/0'/0/1");
    }

    #[test]
    fn test_solana_paths() {
        assert_eq!(DerivationPaths::SOLANA_0, "m/44'/501'/0'/0'");
        assert_eq!(DerivationPaths::solana(2), "m/44'/501'/2'/0'");
    }

    #[test]
    fn test_substrate_paths() {
        assert_eq!(DerivationPaths::SUBSTRATE_0, "//0");
        assert_eq!(DerivationPaths::substrate(7), "//7");
    }

    #[test]
    fn test_for_family_matches_helpers() {
        assert_eq!(
            DerivationPaths::for_family(ChainFamily::Evm, 3),
            DerivationPaths::evm(3)
        );
        assert_eq!(
            DerivationPaths::for_family(ChainFamily::Bitcoin, 3),
            DerivationPaths::btc_native_segwit(0, 3)
        );
        assert_eq!(
            DerivationPaths::for_family(ChainFamily::Solana, 3),
            DerivationPaths::solana(3)
        );
        assert_eq!(
            DerivationPaths::for_family(ChainFamily::Substrate, 3),
            DerivationPaths::substrate(3)
        );
    }

    #[test]
    fn test_for_family_is_injective() {
        // No two (family, index) pairs may produce the same path.
        let families = [
            ChainFamily::Evm,
            ChainFamily::Bitcoin,
            ChainFamily::Solana,
            ChainFamily::Substrate,
        ];
        let mut seen = std::collections::HashSet::new();
        for family in families {
            for index in 0..50 {
                let path = DerivationPaths::for_family(family, index);
                assert!(seen.insert(path.clone()), "path collision on {}", path);
            }
        }
    }

    #[test]
    fn test_custom_builders() {
        assert_eq!(DerivationPaths::bip44(44, 60, 0, 0, 0), "m/44'/60'/0'/0/0");
        assert_eq!(
            DerivationPaths::ed25519_path(501, 0, &[0]),
            "m/44'/501'/0'/0'"
        );
    }
}
