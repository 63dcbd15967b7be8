//! Account classification
//!
//! An address's role is not an account field: it is an on-chain convention stored in
//! the address's own storage. The slot keyed by the ASCII tag `"type"` holds
//! `"template"` or `"contract"` (left-aligned ASCII); anything else, an empty slot
//! included, is an ordinary account. The slot keyed by `"coinbase"` holds the
//! secondary fee beneficiary as an address right-aligned in the word.
//!
//! Raw slot contents never leave this module: callers get an [`AddressRole`].

use crate::core::state::WorldState;
use crate::core::types::{Address, Hash, HASH_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

const TYPE_TAG: &str = "type";
const COINBASE_TAG: &str = "coinbase";
const MARKER_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRole {
    #[default]
    Normal,
    Contract,
    Template,
}

impl AddressRole {
    fn name(&self) -> &'static str {
        match self {
            AddressRole::Normal => "normal",
            AddressRole::Contract => "contract",
            AddressRole::Template => "template",
        }
    }

    /// Decode a `"type"` slot. Only the first eight bytes are significant.
    pub fn from_slot(slot: &Hash) -> AddressRole {
        match &slot.0[..MARKER_WIDTH] {
            b"template" => AddressRole::Template,
            b"contract" => AddressRole::Contract,
            _ => AddressRole::Normal,
        }
    }

    /// Slot value that decodes back to this role.
    pub fn marker(&self) -> Hash {
        tag_key(self.name())
    }
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage key (or marker) for an ASCII tag, left-aligned in the word
pub fn tag_key(tag: &str) -> Hash {
    let mut word = [0u8; HASH_LENGTH];
    let bytes = tag.as_bytes();
    let len = bytes.len().min(HASH_LENGTH);
    word[..len].copy_from_slice(&bytes[..len]);
    Hash(word)
}

/// Storage key of the role marker
pub fn type_key() -> Hash {
    tag_key(TYPE_TAG)
}

/// Storage key of the secondary fee beneficiary
pub fn coinbase_key() -> Hash {
    tag_key(COINBASE_TAG)
}

/// Read the role of `address` from the current state.
pub fn classify<S: WorldState + ?Sized>(state: &S, address: &Address) -> AddressRole {
    AddressRole::from_slot(&state.storage(address, &type_key()))
}

/// Secondary beneficiary recorded for `address`
pub fn recorded_coinbase<S: WorldState + ?Sized>(state: &S, address: &Address) -> Address {
    Address::from_slice(state.storage(address, &coinbase_key()).as_bytes())
}

pub fn mark_role<S: WorldState + ?Sized>(state: &mut S, address: &Address, role: AddressRole) {
    state.set_storage(address, type_key(), role.marker());
}

pub fn record_coinbase<S: WorldState + ?Sized>(state: &mut S, address: &Address, coinbase: &Address) {
    state.set_storage(address, coinbase_key(), Hash::from(*coinbase));
}
