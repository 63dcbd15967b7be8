// World state: the account map the engine reads and mutates. The engine only ever sees
// the `WorldState` trait; `MemoryState` is the in-memory implementation the block
// processor, the CLI and the tests run against.

use crate::core::types::{Address, Hash};
use crate::error::ChainError;
use crate::utils::serialization::{decimal, hex_bytes};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read/write access to accounts, as consumed by the state transition and the
/// execution backend.
pub trait WorldState {
    fn exists(&self, address: &Address) -> bool;
    fn create_account(&mut self, address: &Address);

    fn balance(&self, address: &Address) -> BigUint;
    fn add_balance(&mut self, address: &Address, amount: &BigUint);
    /// Debits `amount`. An account that cannot cover it is left untouched and
    /// `last_error` reports `InsufficientBalance`.
    fn sub_balance(&mut self, address: &Address, amount: &BigUint);

    fn nonce(&self, address: &Address) -> u64;
    fn set_nonce(&mut self, address: &Address, nonce: u64);

    fn code(&self, address: &Address) -> Vec<u8>;
    fn set_code(&mut self, address: &Address, code: Vec<u8>);

    /// Unset slots read as zero.
    fn storage(&self, address: &Address, key: &Hash) -> Hash;
    fn set_storage(&mut self, address: &Address, key: Hash, value: Hash);

    /// Gas credits accumulated during the current transition
    fn refund(&self) -> u64;
    fn add_refund(&mut self, gas: u64);

    /// Last failure recorded by a state mutation since `prepare_transition`
    fn last_error(&self) -> Option<&ChainError>;

    /// Reset the per-transition refund counter and error slot.
    fn prepare_transition(&mut self);

    /// Open a revert point and return its id. Changes made after it are journaled until
    /// it is reverted or discarded.
    fn snapshot(&mut self) -> usize;
    /// Undo every change made since snapshot `id`, closing it and any later snapshot.
    fn revert_to_snapshot(&mut self, id: usize);
    /// Keep the changes made since snapshot `id` and close it and any later snapshot.
    fn discard_snapshot(&mut self, id: usize);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(with = "decimal", default)]
    pub balance: BigUint,
    #[serde(default)]
    pub nonce: u64,
    #[serde(with = "hex_bytes", default)]
    pub code: Vec<u8>,
    #[serde(default)]
    pub storage: BTreeMap<Hash, Hash>,
}

#[derive(Debug, Clone)]
struct Checkpoint {
    journal_len: usize,
    refund: u64,
    last_error: Option<ChainError>,
}

/// Account map with an undo journal. While a snapshot is open, the first write to an
/// account pushes its prior value (or its absence) onto the journal.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    accounts: BTreeMap<Address, Account>,
    refund: u64,
    last_error: Option<ChainError>,
    journal: Vec<(Address, Option<Account>)>,
    snapshots: Vec<Checkpoint>,
}

// Two states are equal when they hold the same accounts and transition slots; open
// snapshots are bookkeeping.
impl PartialEq for MemoryState {
    fn eq(&self, other: &MemoryState) -> bool {
        self.accounts == other.accounts
            && self.refund == other.refund
            && self.last_error == other.last_error
    }
}

impl Eq for MemoryState {}

impl MemoryState {
    pub fn new() -> MemoryState {
        MemoryState::default()
    }

    pub fn from_accounts(accounts: BTreeMap<Address, Account>) -> MemoryState {
        MemoryState {
            accounts,
            ..Default::default()
        }
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn accounts(&self) -> &BTreeMap<Address, Account> {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of all balances, used to check that a block neither mints nor burns.
    pub fn total_balance(&self) -> BigUint {
        self.accounts.values().map(|account| &account.balance).sum()
    }

    fn account_mut(&mut self, address: &Address) -> &mut Account {
        if let Some(checkpoint) = self.snapshots.last() {
            let journaled = self.journal[checkpoint.journal_len..]
                .iter()
                .any(|(touched, _)| touched == address);
            if !journaled {
                let previous = self.accounts.get(address).cloned();
                self.journal.push((*address, previous));
            }
        }
        self.accounts.entry(*address).or_default()
    }

    fn close_snapshots_from(&mut self, id: usize) {
        self.snapshots.truncate(id);
        if self.snapshots.is_empty() {
            self.journal.clear();
        }
    }
}

impl WorldState for MemoryState {
    fn exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn create_account(&mut self, address: &Address) {
        self.account_mut(address);
    }

    fn balance(&self, address: &Address) -> BigUint {
        self.accounts
            .get(address)
            .map(|account| account.balance.clone())
            .unwrap_or_default()
    }

    fn add_balance(&mut self, address: &Address, amount: &BigUint) {
        self.account_mut(address).balance += amount;
    }

    fn sub_balance(&mut self, address: &Address, amount: &BigUint) {
        let account = self.account_mut(address);
        if account.balance < *amount {
            log::warn!(
                "Balance of {address} ({}) cannot cover debit of {amount}",
                account.balance
            );
            self.last_error = Some(ChainError::InsufficientBalance);
            return;
        }
        account.balance -= amount;
    }

    fn nonce(&self, address: &Address) -> u64 {
        self.accounts
            .get(address)
            .map(|account| account.nonce)
            .unwrap_or(0)
    }

    fn set_nonce(&mut self, address: &Address, nonce: u64) {
        self.account_mut(address).nonce = nonce;
    }

    fn code(&self, address: &Address) -> Vec<u8> {
        self.accounts
            .get(address)
            .map(|account| account.code.clone())
            .unwrap_or_default()
    }

    fn set_code(&mut self, address: &Address, code: Vec<u8>) {
        self.account_mut(address).code = code;
    }

    fn storage(&self, address: &Address, key: &Hash) -> Hash {
        self.accounts
            .get(address)
            .and_then(|account| account.storage.get(key).copied())
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: &Address, key: Hash, value: Hash) {
        let storage = &mut self.account_mut(address).storage;
        if value.is_zero() {
            storage.remove(&key);
        } else {
            storage.insert(key, value);
        }
    }

    fn refund(&self) -> u64 {
        self.refund
    }

    fn add_refund(&mut self, gas: u64) {
        self.refund = self.refund.saturating_add(gas);
    }

    fn last_error(&self) -> Option<&ChainError> {
        self.last_error.as_ref()
    }

    fn prepare_transition(&mut self) {
        self.refund = 0;
        self.last_error = None;
    }

    fn snapshot(&mut self) -> usize {
        self.snapshots.push(Checkpoint {
            journal_len: self.journal.len(),
            refund: self.refund,
            last_error: self.last_error.clone(),
        });
        self.snapshots.len() - 1
    }

    fn revert_to_snapshot(&mut self, id: usize) {
        let checkpoint = match self.snapshots.get(id) {
            Some(checkpoint) => checkpoint.clone(),
            None => {
                log::warn!("Revert to unknown snapshot {id}");
                return;
            }
        };
        for (address, previous) in self.journal.drain(checkpoint.journal_len..).rev() {
            match previous {
                Some(account) => {
                    self.accounts.insert(address, account);
                }
                None => {
                    self.accounts.remove(&address);
                }
            }
        }
        self.refund = checkpoint.refund;
        self.last_error = checkpoint.last_error;
        self.close_snapshots_from(id);
    }

    fn discard_snapshot(&mut self, id: usize) {
        self.close_snapshots_from(id);
    }
}
