// keyvault-core/src/chains/substrate.rs
//
// Substrate Chain Adapter - SS58 Addresses & Sr25519 Signing
// Schnorrkel signatures over Ristretto255, SS58 address format

use crate::chains::{ChainFamily, ChainKeyAdapter, ChainKeyHandle};
use crate::error::{CryptoError, WalletError, WalletResult};
use blake2::{Blake2b512, Digest};
use schnorrkel::{signing_context, ExpansionMode, Keypair, MiniSecretKey};

/// SS58 checksum domain separator.
const SS58_PREFIX: &[u8] = b"SS58PRE";

/// Signing context for Substrate signatures. Verifiers must use the same
/// context or verification fails.
const SIGNING_CTX: &[u8] = b"substrate";

/// Substrate Chain Adapter
///
/// # Flow:  Mini Secret (32B) → Keypair (Ed25519 expansion) → SS58 address
///
/// Addresses use the generic Substrate SS58 prefix (42). Signatures are
/// sr25519 Schnorr signatures bound to the `"substrate"` signing context.
///
/// # Determinism
/// Schnorrkel signatures are randomized by design: signing the same bytes
/// twice yields different (both valid) signatures. Callers verify, they do
/// not byte-compare.
pub struct SubstrateAdapter {
    /// SS58 network prefix: 42 = generic, 0 = Polkadot, 2 = Kusama.
    ss58_prefix: u8,
}

impl SubstrateAdapter {
    pub fn new(ss58_prefix: u8) -> Self {
        Self { ss58_prefix }
    }

    fn keypair(handle: &ChainKeyHandle) -> WalletResult<Keypair> {
        let mini = MiniSecretKey::from_bytes(&handle.private_key[..]).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "Invalid sr25519 mini secret: {}",
                e
            )))
        })?;
        // Ed25519 expansion mode matches Substrate's key generation
        Ok(mini.expand_to_keypair(ExpansionMode::Ed25519))
    }

    /// SS58-encode a 32-byte public key under this adapter's prefix.
    ///
    /// Format: base58( prefix || pubkey || blake2b-512("SS58PRE" || prefix || pubkey)[..2] )
    pub fn ss58_encode(&self, public_key: &[u8; 32]) -> String {
        let mut data = Vec::with_capacity(1 + 32 + 2);
        data.push(self.ss58_prefix);
        data.extend_from_slice(public_key);

        let mut hasher = Blake2b512::new();
        hasher.update(SS58_PREFIX);
        hasher.update(&data);
        let checksum = hasher.finalize();
        data.extend_from_slice(&checksum[..2]);

        bs58::encode(data).into_string()
    }

    /// Decode an SS58 address back to its public key, verifying the checksum.
    pub fn ss58_decode(address: &str) -> WalletResult<[u8; 32]> {
        let raw = bs58::decode(address).into_vec().map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "Invalid SS58 base58: {}",
                e
            )))
        })?;

        if raw.len() != 35 {
            return Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "Invalid SS58 length: {}",
                raw.len()
            ))));
        }

        let mut hasher = Blake2b512::new();
        hasher.update(SS58_PREFIX);
        hasher.update(&raw[..33]);
        let checksum = hasher.finalize();
        if raw[33..] != checksum[..2] {
            return Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(
                "SS58 checksum mismatch".to_string(),
            )));
        }

        let mut pubkey = [0u8; 32];
        pubkey.copy_from_slice(&raw[1..33]);
        Ok(pubkey)
    }

    /// Verify an sr25519 signature against an SS58 address.
    pub fn verify(address: &str, message: &[u8], signature: &[u8]) -> bool {
        let Ok(pubkey_bytes) = Self::ss58_decode(address) else {
            return false;
        };
        let Ok(public_key) = schnorrkel::PublicKey::from_bytes(&pubkey_bytes) else {
            return false;
        };
        let Ok(sig) = schnorrkel::Signature::from_bytes(signature) else {
            return false;
        };
        public_key
            .verify(signing_context(SIGNING_CTX).bytes(message), &sig)
            .is_ok()
    }
}

impl Default for SubstrateAdapter {
    /// Generic Substrate prefix (42).
    fn default() -> Self {
        Self::new(42)
    }
}

impl ChainKeyAdapter for SubstrateAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Substrate
    }

    /// SS58 address, e.g. `"5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"`.
    fn address(&self, handle: &ChainKeyHandle) -> WalletResult<String> {
        let keypair = Self::keypair(handle)?;
        Ok(self.ss58_encode(&keypair.public.to_bytes()))
    }

    /// Raw sr25519 public key (32 bytes).
    fn public_key(&self, handle: &ChainKeyHandle) -> WalletResult<Vec<u8>> {
        let keypair = Self::keypair(handle)?;
        Ok(keypair.public.to_bytes().to_vec())
    }

    /// Sr25519 signature bound to the `"substrate"` context (64 bytes).
    fn sign_message(&self, handle: &ChainKeyHandle, message: &[u8]) -> WalletResult<Vec<u8>> {
        let keypair = Self::keypair(handle)?;
        let signature = keypair.sign(signing_context(SIGNING_CTX).bytes(message));
        Ok(signature.to_bytes().to_vec())
    }

    /// Same signing path as messages: Substrate extrinsic payloads are
    /// signed as opaque bytes under the `"substrate"` context.
    fn sign_transaction(&self, handle: &ChainKeyHandle, payload: &[u8]) -> WalletResult<Vec<u8>> {
        self.sign_message(handle, payload)
    }
}

// =============================================================================
// TESTS
// =============================================================================
