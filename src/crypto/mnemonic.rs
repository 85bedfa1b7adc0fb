// keyvault-core/src/crypto/mnemonic.rs
//
// Mnemonic Module - BIP-39 Recovery Phrase Lifecycle
// Standards: BIP-39 (Mnemonic), PBKDF2-HMAC-SHA512 (Seed Derivation)

use crate::error::{MnemonicError, WalletError, WalletResult};
use bip39::Mnemonic;
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Supported phrase lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCount {
    /// 12 words (128-bit entropy)
    Twelve = 12,
    /// 15 words (160-bit entropy)
    Fifteen = 15,
    /// 18 words (192-bit entropy)
    Eighteen = 18,
    /// 21 words (224-bit entropy)
    TwentyOne = 21,
    /// 24 words (256-bit entropy)
    TwentyFour = 24,
}

impl WordCount {
    /// Entropy bytes backing this word count.
    #[inline]
    pub const fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::Fifteen => 20,
            WordCount::Eighteen => 24,
            WordCount::TwentyOne => 28,
            WordCount::TwentyFour => 32,
        }
    }

    /// Entropy strength in bits.
    #[inline]
    pub const fn strength_bits(self) -> usize {
        self.entropy_bytes() * 8
    }
}

/// Wallet recovery phrase.
///
/// # Security
/// - **ZeroizeOnDrop**: the phrase is overwritten with zeros when dropped
/// - **CSPRNG**: entropy comes from `OsRng` (OS-level secure RNG)
/// - **No Debug Leak**: custom Debug impl never shows the phrase
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WalletMnemonic {
    phrase: String,
    word_count: usize,
}

// Custom Debug - NEVER display the mnemonic phrase
impl std::fmt::Debug for WalletMnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletMnemonic")
            .field("word_count", &self.word_count)
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl WalletMnemonic {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Generate a fresh mnemonic with the given word count.
    pub fn generate(word_count: WordCount) -> Self {
        let entropy_size = word_count.entropy_bytes();

        // Stack-allocated entropy buffer (max 32 bytes)
        let mut entropy = [0u8; 32];
        OsRng.fill_bytes(&mut entropy[..entropy_size]);

        let mnemonic =
            Mnemonic::from_entropy(&entropy[..entropy_size]).expect("Valid entropy size");

        // Zeroize entropy immediately after use
        entropy.zeroize();

        Self {
            phrase: mnemonic.to_string(),
            word_count: word_count as usize,
        }
    }

    /// Restore a mnemonic from an existing phrase.
    ///
    /// # Validation
    /// - Word count must be 12, 15, 18, 21 or 24
    /// - Every word must belong to the BIP-39 English wordlist
    /// - The embedded checksum must verify
    pub fn from_phrase(phrase: &str) -> WalletResult<Self> {
        // Normalize whitespace and count words
        let normalized = phrase.split_whitespace().collect::<Vec<_>>();
        let count = normalized.len();

        if !matches!(count, 12 | 15 | 18 | 21 | 24) {
            return Err(WalletError::Mnemonic(MnemonicError::InvalidWordCount(
                count,
            )));
        }

        let normalized_phrase = normalized.join(" ");
        Mnemonic::parse(&normalized_phrase).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("invalid word") || msg.contains("unknown word") {
                WalletError::Mnemonic(MnemonicError::UnknownWord(msg))
            } else if msg.contains("checksum") {
                WalletError::Mnemonic(MnemonicError::ChecksumFailed)
            } else {
                WalletError::Mnemonic(MnemonicError::Bip39Error(msg))
            }
        })?;

        Ok(Self {
            phrase: normalized_phrase,
            word_count: count,
        })
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    /// The phrase itself. Handle with care: never log or display casually.
    #[inline]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Entropy strength in bits (128 for 12 words, ..., 256 for 24).
    pub fn strength_bits(&self) -> usize {
        match self.word_count {
            12 => 128,
            15 => 160,
            18 => 192,
            21 => 224,
            24 => 256,
            _ => 0,
        }
    }

    // =========================================================================
    // SEED DERIVATION
    // =========================================================================

    /// Derive the 64-byte binary seed (PBKDF2-HMAC-SHA512 per BIP-39).
    ///
    /// Pure and deterministic: the same phrase + passphrase always yields
    /// the same seed. The optional passphrase is the BIP-39 "25th word" —
    /// losing it makes the wallet unrecoverable even with the phrase.
    pub fn to_seed(&self, passphrase: Option<&str>) -> Zeroizing<[u8; 64]> {
        let password = passphrase.unwrap_or("");
        let mnemonic = Mnemonic::parse(&self.phrase).expect("Internal phrase is valid");
        Zeroizing::new(mnemonic.to_seed(password))
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Full validation: word count, wordlist membership, checksum.
    ///
    /// A phrase built from valid words but with a wrong checksum is
    /// rejected, never silently accepted.
    #[inline]
    pub fn validate(phrase: &str) -> bool {
        let count = phrase.split_whitespace().count();
        if !matches!(count, 12 | 15 | 18 | 21 | 24) {
            return false;
        }
        Mnemonic::parse(phrase).is_ok()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Standard test mnemonic (from BIP-39 test vectors)
    const TEST_MNEMONIC_12: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const TEST_MNEMONIC_24: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";

    #[test]
    fn test_generate_12_words() {
        let mnemonic = WalletMnemonic::generate(WordCount::Twelve);
        assert_eq!(mnemonic.word_count(), 12);
        assert!(WalletMnemonic::validate(mnemonic.phrase()));
    }

    #[test]
    fn test_generate_24_words() {
        let mnemonic = WalletMnemonic::generate(WordCount::TwentyFour);
        assert_eq!(mnemonic.word_count(), 24);
        assert!(WalletMnemonic::validate(mnemonic.phrase()));
    }

    #[test]
    fn test_from_phrase_valid() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC_12).unwrap();
        assert_eq!(mnemonic.word_count(), 12);
    }

    #[test]
    fn test_from_phrase_24_words() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC_24).unwrap();
        assert_eq!(mnemonic.word_count(), 24);
    }

    #[test]
    fn test_from_phrase_normalizes_whitespace() {
        let messy_phrase =
            "  abandon  abandon   abandon abandon abandon abandon abandon abandon abandon abandon abandon about  ";
        let mnemonic = WalletMnemonic::from_phrase(messy_phrase).unwrap();
        assert_eq!(mnemonic.word_count(), 12);
        assert!(!mnemonic.phrase().starts_with(' '));
        assert!(!mnemonic.phrase().ends_with(' '));
    }

    #[test]
    fn test_from_phrase_invalid_word_count() {
        let result = WalletMnemonic::from_phrase("abandon abandon abandon");
        assert!(matches!(
            result,
            Err(WalletError::Mnemonic(MnemonicError::InvalidWordCount(3)))
        ));
    }

    #[test]
    fn test_from_phrase_invalid_word() {
        let invalid = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon invalid";
        let result = WalletMnemonic::from_phrase(invalid);
        assert!(matches!(
            result,
            Err(WalletError::Mnemonic(MnemonicError::UnknownWord(_)))
        ));
    }

    #[test]
    fn test_checksum_rejection() {
        // All words valid, but the final word breaks the checksum
        let bad_checksum = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(!WalletMnemonic::validate(bad_checksum));
        assert!(WalletMnemonic::from_phrase(bad_checksum).is_err());
    }

    #[test]
    fn test_to_seed() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC_12).unwrap();
        let seed = mnemonic.to_seed(None);
        assert_eq!(seed.len(), 64);
        // Known BIP-39 vector (passphrase "")
        assert!(hex::encode(&seed[..8]).starts_with("5eb00bbd"));
    }

    #[test]
    fn test_to_seed_with_passphrase() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC_12).unwrap();
        let seed_no_pass = mnemonic.to_seed(None);
        let seed_with_pass = mnemonic.to_seed(Some("TREZOR"));
        assert_ne!(&*seed_no_pass, &*seed_with_pass);
    }

    #[test]
    fn test_to_seed_deterministic() {
        let m1 = WalletMnemonic::from_phrase(TEST_MNEMONIC_12).unwrap();
        let m2 = WalletMnemonic::from_phrase(TEST_MNEMONIC_12).unwrap();
        assert_eq!(&*m1.to_seed(None), &*m2.to_seed(None));
    }

    #[test]
    fn test_validate() {
        assert!(WalletMnemonic::validate(TEST_MNEMONIC_12));
        assert!(WalletMnemonic::validate(TEST_MNEMONIC_24));
        assert!(!WalletMnemonic::validate("invalid mnemonic phrase"));
        assert!(!WalletMnemonic::validate("abandon")); // Too few words
    }

    #[test]
    fn test_strength_bits() {
        let m12 = WalletMnemonic::generate(WordCount::Twelve);
        let m24 = WalletMnemonic::generate(WordCount::TwentyFour);
        assert_eq!(m12.strength_bits(), 128);
        assert_eq!(m24.strength_bits(), 256);
        assert_eq!(WordCount::Eighteen.strength_bits(), 192);
    }

    #[test]
    fn test_debug_does_not_leak_phrase() {
        let mnemonic = WalletMnemonic::from_phrase(TEST_MNEMONIC_12).unwrap();
        let debug_output = format!("{:?}", mnemonic);
        assert!(!debug_output.contains("abandon"));
        assert!(debug_output.contains("REDACTED"));
        assert!(debug_output.contains("word_count: 12"));
    }

    #[test]
    fn test_unique_generation() {
        let m1 = WalletMnemonic::generate(WordCount::Twelve);
        let m2 = WalletMnemonic::generate(WordCount::Twelve);
        assert_ne!(m1.phrase(), m2.phrase());
    }
}
