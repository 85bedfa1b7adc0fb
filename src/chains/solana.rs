// keyvault-core/src/chains/solana.rs
//
// Solana Chain Adapter - Base58 Addresses & Raw Ed25519 Signing
// SLIP-0010 derivation, ed25519-dalek signatures

use crate::chains::{ChainFamily, ChainKeyAdapter, ChainKeyHandle};
use crate::error::WalletResult;
use ed25519_dalek::{Signer, SigningKey, Verifier};

/// Solana Chain Adapter
///
/// # Flow:  Private Key (32B) → ed25519 Verifying Key (32B) → base58
///
/// Solana has no separate address hashing step: the address IS the base58
/// encoding of the public key. Both messages and transaction payloads are
/// signed with raw ed25519 over the exact bytes given (Solana hashes
/// nothing before signing).
#[derive(Default)]
pub struct SolanaAdapter;

impl SolanaAdapter {
    fn signing_key(handle: &ChainKeyHandle) -> SigningKey {
        // Any 32 bytes form a valid ed25519 secret key
        SigningKey::from_bytes(&handle.private_key)
    }

    /// Verify a signature against an address (base58 public key).
    pub fn verify(address: &str, message: &[u8], signature: &[u8]) -> bool {
        let Ok(pubkey_bytes) = bs58::decode(address).into_vec() else {
            return false;
        };
        let Ok(pubkey_arr) = <[u8; 32]>::try_from(pubkey_bytes.as_slice()) else {
            return false;
        };
        let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_bytes(&pubkey_arr) else {
            return false;
        };
        let Ok(sig) = ed25519_dalek::Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl ChainKeyAdapter for SolanaAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    /// Base58-encoded public key, e.g. `"DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK"`.
    fn address(&self, handle: &ChainKeyHandle) -> WalletResult<String> {
        let verifying_key = Self::signing_key(handle).verifying_key();
        Ok(bs58::encode(verifying_key.as_bytes()).into_string())
    }

    /// Raw ed25519 public key (32 bytes).
    fn public_key(&self, handle: &ChainKeyHandle) -> WalletResult<Vec<u8>> {
        Ok(Self::signing_key(handle).verifying_key().as_bytes().to_vec())
    }

    /// Raw ed25519 signature over the message bytes (64 bytes).
    fn sign_message(&self, handle: &ChainKeyHandle, message: &[u8]) -> WalletResult<Vec<u8>> {
        let signature = Self::signing_key(handle).sign(message);
        Ok(signature.to_bytes().to_vec())
    }

    /// Identical to message signing: Solana signs serialized transaction
    /// bytes directly with ed25519.
    fn sign_transaction(&self, handle: &ChainKeyHandle, payload: &[u8]) -> WalletResult<Vec<u8>> {
        self.sign_message(handle, payload)
    }
}

// =============================================================================
// TESTS
// =============================================================================
