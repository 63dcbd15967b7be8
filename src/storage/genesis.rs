//! Genesis allocation
//!
//! A TOML file with the chain parameters and the initial accounts:
//!
//! ```toml
//! [config]
//! homestead_block = 0
//! block_gas_limit = 4712388
//!
//! [alloc."0x1111111111111111111111111111111111111111"]
//! balance = "1000000000000000000"
//!
//! [alloc."0x2222222222222222222222222222222222222222"]
//! code = "0x6000"
//! role = "template"
//! coinbase = "0x1111111111111111111111111111111111111111"
//! ```

use crate::config::ChainConfig;
use crate::core::classifier::{mark_role, record_coinbase, AddressRole};
use crate::core::state::{Account, MemoryState};
use crate::core::types::{Address, Hash};
use crate::error::Result;
use crate::utils::serialization::{decimal, hex_bytes};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    #[serde(with = "decimal", default)]
    pub balance: BigUint,
    #[serde(default)]
    pub nonce: u64,
    #[serde(with = "hex_bytes", default)]
    pub code: Vec<u8>,
    #[serde(default)]
    pub storage: BTreeMap<Hash, Hash>,
    /// Written to the role marker slot
    #[serde(default)]
    pub role: Option<AddressRole>,
    /// Written to the secondary beneficiary slot
    #[serde(default)]
    pub coinbase: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    #[serde(default)]
    pub config: ChainConfig,
    #[serde(default)]
    pub alloc: BTreeMap<Address, GenesisAccount>,
}

impl Genesis {
    pub fn from_toml_str(text: &str) -> Result<Genesis> {
        let genesis: Genesis = toml::from_str(text)?;
        genesis.config.validate()?;
        Ok(genesis)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Genesis> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// World state at block zero
    pub fn to_state(&self) -> MemoryState {
        let accounts = self
            .alloc
            .iter()
            .map(|(address, alloc)| {
                let account = Account {
                    balance: alloc.balance.clone(),
                    nonce: alloc.nonce,
                    code: alloc.code.clone(),
                    storage: alloc.storage.clone(),
                };
                (*address, account)
            })
            .collect();
        let mut state = MemoryState::from_accounts(accounts);

        for (address, alloc) in &self.alloc {
            if let Some(role) = alloc.role {
                mark_role(&mut state, address, role);
            }
            if let Some(coinbase) = &alloc.coinbase {
                record_coinbase(&mut state, address, coinbase);
            }
        }
        state
    }
}
