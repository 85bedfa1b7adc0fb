// keyvault-core/src/accounts.rs
//
// Account Ledger - Derived Account Metadata
//
// The ledger holds only public metadata (family, index, path, address,
// public key). Private keys are never stored here; they are re-derived
// from the seed on demand.

use crate::chains::ChainFamily;
use crate::error::{WalletError, WalletResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// =============================================================================
// ACCOUNT
// =============================================================================

/// Opaque account identifier, stable across lock/unlock cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A derived account: public metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub family: ChainFamily,
    /// Account index within the family (drives the derivation path).
    pub index: u32,
    /// Derivation path this account's keys come from.
    pub path: String,
    /// Canonical address string for the family.
    pub address: String,
    /// Public key bytes, hex-encoded.
    pub public_key: String,
    /// Optional user-facing label.
    pub name: Option<String>,
}

// =============================================================================
// ACCOUNT LEDGER
// =============================================================================

/// In-memory account registry.
///
/// Accounts live in an arena (creation order preserved) with an id index
/// on the side. One counter per family tracks the next free index, so
/// `(family, index)` pairs are unique by construction.
#[derive(Debug, Default)]
pub struct AccountLedger {
    arena: Vec<Account>,
    by_id: HashMap<AccountId, usize>,
    next_index: HashMap<ChainFamily, u32>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index the next account of this family would get.
    ///
    /// Starts at 0 for a family with no accounts; explicit out-of-order
    /// inserts push it past the highest index used.
    #[inline]
    pub fn next_index(&self, family: ChainFamily) -> u32 {
        self.next_index.get(&family).copied().unwrap_or(0)
    }

    /// Insert an account, enforcing `(family, index)` uniqueness.
    pub fn insert(&mut self, account: Account) -> WalletResult<AccountId> {
        if self
            .arena
            .iter()
            .any(|a| a.family == account.family && a.index == account.index)
        {
            return Err(WalletError::Validation(format!(
                "Account already exists for family '{}' at index {}",
                account.family, account.index
            )));
        }

        // An explicit index at or past the counter advances it
        let counter = self.next_index.entry(account.family).or_insert(0);
        if account.index >= *counter {
            *counter = account.index + 1;
        }

        let id = account.id;
        self.by_id.insert(id, self.arena.len());
        self.arena.push(account);
        Ok(id)
    }

    /// Look up by id.
    #[inline]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.by_id.get(&id).map(|&slot| &self.arena[slot])
    }

    /// All accounts in creation order.
    #[inline]
    pub fn list(&self) -> &[Account] {
        &self.arena
    }

    /// Accounts of one family, in creation order.
    pub fn list_by_family(&self, family: ChainFamily) -> Vec<&Account> {
        self.arena.iter().filter(|a| a.family == family).collect()
    }

    /// Find the account owning an address.
    ///
    /// Hex addresses (EVM) match case-insensitively since EIP-55 casing is
    /// a display property; base58/bech32 addresses match exactly.
    pub fn find_by_address(&self, address: &str) -> Option<&Account> {
        self.arena.iter().find(|a| {
            if a.address.starts_with("0x") && address.starts_with("0x") {
                a.address.eq_ignore_ascii_case(address)
            } else {
                a.address == address
            }
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Drop all accounts and counters.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.by_id.clear();
        self.next_index.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
