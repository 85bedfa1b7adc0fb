// keyvault-core/src/vault.rs
//
// Encrypted Vault - PBKDF2 Key Derivation + AES-256-GCM
//
// Wire format: JSON envelope with base64 fields. Every seal draws a fresh
// salt and nonce; the KDF iteration count is stored alongside so the vault
// is self-describing.

use crate::error::{CryptoError, WalletError, WalletResult};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use zeroize::Zeroizing;

/// Envelope format version.
pub const VAULT_VERSION: u32 = 1;
/// Production PBKDF2-HMAC-SHA512 iteration count.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Serde adapter: raw bytes <-> base64 strings in the JSON envelope.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// A sealed vault payload.
///
/// # Security
/// - AES-256-GCM: tampering with any field makes `open` fail
/// - The envelope never contains key material, only salt/nonce/ciphertext
/// - `open` failures are opaque: wrong password and corrupted data are
///   indistinguishable to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVault {
    pub version: u32,
    /// PBKDF2 iteration count used to derive this vault's key.
    pub iterations: u32,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub tag: Vec<u8>,
}

impl EncryptedVault {
    // =========================================================================
    // KEY DERIVATION
    // =========================================================================

    /// Derive the vault key: PBKDF2-HMAC-SHA512(password, salt, iterations).
    pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; KEY_LEN]> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, iterations, &mut *key);
        key
    }

    // =========================================================================
    // SEAL
    // =========================================================================

    /// Seal plaintext under a password with production KDF parameters.
    pub fn seal(plaintext: &[u8], password: &str) -> WalletResult<Self> {
        Self::seal_with_iterations(plaintext, password, DEFAULT_KDF_ITERATIONS)
    }

    /// Seal with an explicit iteration count (tests use light parameters).
    pub fn seal_with_iterations(
        plaintext: &[u8],
        password: &str,
        iterations: u32,
    ) -> WalletResult<Self> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let key = Self::derive_key(password, &salt, iterations);
        Self::seal_with_key(plaintext, &key, &salt, iterations)
    }

    /// Seal with an already-derived key.
    ///
    /// Used to re-seal without the password (the nonce is always fresh, so
    /// reusing a key across seals is safe for AES-GCM).
    pub fn seal_with_key(
        plaintext: &[u8],
        key: &[u8; KEY_LEN],
        salt: &[u8],
        iterations: u32,
    ) -> WalletResult<Self> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| WalletError::Crypto(CryptoError::Encryption(e.to_string())))?;

        let mut ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| WalletError::Crypto(CryptoError::Encryption(e.to_string())))?;

        // aes-gcm appends the tag; store it as its own field
        let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

        Ok(Self {
            version: VAULT_VERSION,
            iterations,
            salt: salt.to_vec(),
            nonce: nonce.to_vec(),
            ciphertext,
            tag,
        })
    }

    // =========================================================================
    // OPEN
    // =========================================================================

    /// Open with a password.
    ///
    /// # Security
    /// Every failure mode (wrong password, truncated fields, flipped bits)
    /// returns the same opaque error.
    pub fn open(&self, password: &str) -> WalletResult<Zeroizing<Vec<u8>>> {
        let key = Self::derive_key(password, &self.salt, self.iterations);
        self.open_with_key(&key)
    }

    /// Open with an already-derived key.
    pub fn open_with_key(&self, key: &[u8; KEY_LEN]) -> WalletResult<Zeroizing<Vec<u8>>> {
        if self.nonce.len() != NONCE_LEN || self.tag.len() != TAG_LEN {
            return Err(Self::opaque_failure());
        }

        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| Self::opaque_failure())?;

        // Reassemble ciphertext || tag for the AEAD
        let mut sealed = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&self.ciphertext);
        sealed.extend_from_slice(&self.tag);

        cipher
            .decrypt(Nonce::from_slice(&self.nonce), sealed.as_slice())
            .map(Zeroizing::new)
            .map_err(|_| Self::opaque_failure())
    }

    fn opaque_failure() -> WalletError {
        WalletError::Crypto(CryptoError::Encryption("Vault open failed".to_string()))
    }

    // =========================================================================
    // WIRE FORMAT
    // =========================================================================

    pub fn to_json(&self) -> WalletResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| WalletError::Crypto(CryptoError::Encryption(e.to_string())))
    }

    pub fn from_json(bytes: &[u8]) -> WalletResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| WalletError::Crypto(CryptoError::Encryption(e.to_string())))
    }
}

// =============================================================================
// TESTS
// =============================================================================
