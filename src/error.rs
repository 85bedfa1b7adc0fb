use crate::chains::ChainFamily;
use thiserror::Error;

pub type WalletResult<T> = std::result::Result<T, WalletError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Mnemonic Error: {0}")]
    Mnemonic(#[from] MnemonicError),

    #[error("Cryptography Error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Keyring Error: {0}")]
    Keyring(#[from] KeyringError),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("IO Error: {0}")]
    Io(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("Invalid word count: {0}. Expected 12, 15, 18, 21 or 24 words.")]
    InvalidWordCount(usize),

    #[error("Word '{0}' not found in the BIP39 wordlist.")]
    UnknownWord(String),

    #[error("Checksum validation failed.")]
    ChecksumFailed,

    #[error("BIP39 internal error: {0}")]
    Bip39Error(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),
}

/// Lifecycle and dispatch failures of the keyring itself.
///
/// `UnlockFailed` is deliberately opaque: a wrong password and a corrupted
/// vault produce the identical error, so callers cannot tell them apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyringError {
    #[error("Keyring is already initialized.")]
    AlreadyInitialized,

    #[error("Keyring is not initialized.")]
    NotInitialized,

    #[error("Keyring is locked.")]
    Locked,

    #[error("Unlock failed.")]
    UnlockFailed,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("No adapter registered for chain family: {0}")]
    UnsupportedChainFamily(ChainFamily),
}
