// keyvault-core/src/chains/utxo.rs
//
// Bitcoin Chain Adapter - P2WPKH Addresses & Message Signing
// BIP-84 (Native SegWit), BIP-173 (Bech32), Bitcoin Signed Message

use crate::chains::{ChainFamily, ChainKeyAdapter, ChainKeyHandle};
use crate::error::{CryptoError, WalletError, WalletResult};
use bech32::{ToBase32, Variant};
use k256::ecdsa::SigningKey;
use k256::{elliptic_curve::sec1::ToEncodedPoint, SecretKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Bitcoin Chain Adapter
///
/// # Flow:  Private Key (32B) → Compressed Pubkey (33B) → hash160 → bech32
///
/// Addresses are Native SegWit (P2WPKH, witness version 0), matching the
/// BIP-84 derivation policy. Message signing follows the classic
/// "Bitcoin Signed Message" convention with a recoverable signature.
pub struct UtxoAdapter {
    /// Human-readable part: "bc" mainnet, "tb" testnet.
    hrp: String,
}

impl UtxoAdapter {
    const MESSAGE_MAGIC: &'static [u8] = b"\x18Bitcoin Signed Message:\n";

    pub fn new(hrp: impl Into<String>) -> Self {
        Self { hrp: hrp.into() }
    }

    /// hash160 = RIPEMD160(SHA256(data))
    fn hash160(data: &[u8]) -> [u8; 20] {
        let sha = Sha256::digest(data);
        let ripe = Ripemd160::digest(sha);
        let mut out = [0u8; 20];
        out.copy_from_slice(&ripe);
        out
    }

    /// Double SHA-256
    fn dsha256(data: &[u8]) -> [u8; 32] {
        let first = Sha256::digest(data);
        let second = Sha256::digest(first);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second);
        out
    }

    /// Bitcoin variable-length integer encoding.
    fn write_varint(buf: &mut Vec<u8>, n: u64) {
        match n {
            0..=0xfc => buf.push(n as u8),
            0xfd..=0xffff => {
                buf.push(0xfd);
                buf.extend_from_slice(&(n as u16).to_le_bytes());
            }
            0x10000..=0xffff_ffff => {
                buf.push(0xfe);
                buf.extend_from_slice(&(n as u32).to_le_bytes());
            }
            _ => {
                buf.push(0xff);
                buf.extend_from_slice(&n.to_le_bytes());
            }
        }
    }

    /// The digest signed by the Bitcoin Signed Message convention:
    /// dsha256(magic || varint(len) || message)
    fn message_digest(message: &[u8]) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(Self::MESSAGE_MAGIC.len() + 9 + message.len());
        preimage.extend_from_slice(Self::MESSAGE_MAGIC);
        Self::write_varint(&mut preimage, message.len() as u64);
        preimage.extend_from_slice(message);
        Self::dsha256(&preimage)
    }

    fn compressed_pubkey(handle: &ChainKeyHandle) -> WalletResult<Vec<u8>> {
        let secret_key = SecretKey::from_slice(&handle.private_key[..]).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "Invalid secp256k1 private key: {}",
                e
            )))
        })?;
        Ok(secret_key
            .public_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec())
    }

    /// P2WPKH bech32 address for a compressed public key.
    pub fn p2wpkh_address(&self, compressed_pubkey: &[u8]) -> WalletResult<String> {
        let hash = Self::hash160(compressed_pubkey);

        // Witness program: version 0 followed by the 20-byte key hash
        let mut data = vec![bech32::u5::try_from_u8(0).expect("0 is a valid u5")];
        data.extend(hash.to_base32());

        bech32::encode(&self.hrp, data, Variant::Bech32)
            .map_err(|e| WalletError::Crypto(CryptoError::InvalidKeyFormat(format!(
                "bech32 encoding failed: {}",
                e
            ))))
    }

    /// Legacy P2PKH base58check address (version byte 0x00).
    pub fn legacy_address(compressed_pubkey: &[u8]) -> String {
        let hash = Self::hash160(compressed_pubkey);

        let mut payload = Vec::with_capacity(25);
        payload.push(0x00);
        payload.extend_from_slice(&hash);
        let checksum = Self::dsha256(&payload);
        payload.extend_from_slice(&checksum[..4]);

        bs58::encode(payload).into_string()
    }
}

impl Default for UtxoAdapter {
    /// Bitcoin mainnet.
    fn default() -> Self {
        Self::new("bc")
    }
}

impl ChainKeyAdapter for UtxoAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Bitcoin
    }

    /// Native SegWit address, e.g. `"bc1q..."`.
    fn address(&self, handle: &ChainKeyHandle) -> WalletResult<String> {
        let pubkey = Self::compressed_pubkey(handle)?;
        self.p2wpkh_address(&pubkey)
    }

    /// Compressed SEC1 public key (33 bytes).
    fn public_key(&self, handle: &ChainKeyHandle) -> WalletResult<Vec<u8>> {
        Self::compressed_pubkey(handle)
    }

    /// Bitcoin Signed Message.
    ///
    /// Returns the 65-byte compact recoverable signature: header byte
    /// (31 + recovery id, compressed-key range) followed by r || s.
    fn sign_message(&self, handle: &ChainKeyHandle, message: &[u8]) -> WalletResult<Vec<u8>> {
        let signing_key = SigningKey::from_slice(&handle.private_key[..]).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(e.to_string()))
        })?;

        let digest = Self::message_digest(message);
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| WalletError::Crypto(CryptoError::SigningFailed(e.to_string())))?;

        let mut out = Vec::with_capacity(65);
        out.push(31 + recovery_id.to_byte());
        out.extend_from_slice(&signature.to_bytes());
        Ok(out)
    }

    /// Deterministic signature over dsha256(payload).
    ///
    /// The payload is treated as opaque pre-image bytes; transaction
    /// construction (inputs, scripts, sighash assembly) belongs to the
    /// caller. Returns compact r || s plus the recovery id byte.
    fn sign_transaction(&self, handle: &ChainKeyHandle, payload: &[u8]) -> WalletResult<Vec<u8>> {
        let signing_key = SigningKey::from_slice(&handle.private_key[..]).map_err(|e| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(e.to_string()))
        })?;

        let digest = Self::dsha256(payload);
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| WalletError::Crypto(CryptoError::SigningFailed(e.to_string())))?;

        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&signature.to_bytes());
        out.push(recovery_id.to_byte());
        Ok(out)
    }
}

// =============================================================================
// TESTS
// =============================================================================
