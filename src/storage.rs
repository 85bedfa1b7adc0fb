// keyvault-core/src/storage.rs
//
// Vault Persistence - Storage Backends
//
// The keyring talks to storage through `VaultStore`, so swapping a file
// for a database (or a test double) never touches the lifecycle logic.

use crate::error::{WalletError, WalletResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persistence seam for the sealed vault envelope.
///
/// Stores hold exactly one vault blob. Implementations never see
/// plaintext: the keyring only hands them sealed JSON bytes.
pub trait VaultStore: Send {
    /// Persist the sealed envelope, replacing any previous one.
    fn save(&mut self, bytes: &[u8]) -> WalletResult<()>;

    /// Load the sealed envelope, `None` if nothing was ever saved.
    fn load(&self) -> WalletResult<Option<Vec<u8>>>;

    /// Remove the stored envelope, if any.
    fn clear(&mut self) -> WalletResult<()>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory store for tests and ephemeral keyrings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VaultStore for MemoryStore {
    fn save(&mut self, bytes: &[u8]) -> WalletResult<()> {
        self.data = Some(bytes.to_vec());
        Ok(())
    }

    fn load(&self) -> WalletResult<Option<Vec<u8>>> {
        Ok(self.data.clone())
    }

    fn clear(&mut self) -> WalletResult<()> {
        self.data = None;
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// File-backed store.
///
/// Writes go to a sibling temp file first, then rename over the target, so
/// a crash mid-write never leaves a truncated vault.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(e: std::io::Error) -> WalletError {
        WalletError::Io(e.to_string())
    }
}

impl VaultStore for FileStore {
    fn save(&mut self, bytes: &[u8]) -> WalletResult<()> {
        let tmp_path = self.path.with_extension("tmp");

        let mut file = fs::File::create(&tmp_path).map_err(Self::io_err)?;
        file.write_all(bytes).map_err(Self::io_err)?;
        file.sync_all().map_err(Self::io_err)?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(Self::io_err)
    }

    fn load(&self) -> WalletResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(e)),
        }
    }

    fn clear(&mut self) -> WalletResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(e)),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
