// Sled-backed persistence for the world state between blocks. Accounts live in their
// own tree keyed by address; receipts are keyed by block number; the head number and
// chain config sit in a small meta tree.

use crate::config::ChainConfig;
use crate::core::block::Receipt;
use crate::core::state::{Account, MemoryState, WorldState};
use crate::core::types::Address;
use crate::error::{ChainError, Result};
use crate::utils::{deserialize, serialize};
use log::info;
use sled::{Batch, Db, Tree};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const ACCOUNTS_TREE: &str = "accounts";
const RECEIPTS_TREE: &str = "receipts";
const META_TREE: &str = "meta";

const HEAD_NUMBER_KEY: &str = "head_number";
const CHAIN_CONFIG_KEY: &str = "chain_config";

#[derive(Clone)]
pub struct StateStore {
    db: Db,
    db_path: PathBuf,
}

impl StateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<StateStore> {
        let db_path = path.as_ref().to_path_buf();
        let db = sled::open(&db_path)
            .map_err(|e| ChainError::Database(format!("Failed to open database: {e}")))?;
        Ok(StateStore { db, db_path })
    }

    pub fn get_db_path(&self) -> &PathBuf {
        &self.db_path
    }

    fn tree(&self, name: &str) -> Result<Tree> {
        self.db
            .open_tree(name)
            .map_err(|e| ChainError::Database(format!("Failed to open {name} tree: {e}")))
    }

    /// Every stored account, in address order
    pub fn load_state(&self) -> Result<MemoryState> {
        let accounts_tree = self.tree(ACCOUNTS_TREE)?;
        let mut accounts = BTreeMap::new();
        for entry in accounts_tree.iter() {
            let (key, value) = entry
                .map_err(|e| ChainError::Database(format!("Failed to read account: {e}")))?;
            let account: Account = deserialize(value.as_ref())?;
            accounts.insert(Address::from_slice(key.as_ref()), account);
        }
        Ok(MemoryState::from_accounts(accounts))
    }

    /// Replace the stored accounts with the contents of `state`.
    pub fn commit_state(&self, state: &MemoryState) -> Result<()> {
        let accounts_tree = self.tree(ACCOUNTS_TREE)?;
        let mut batch = Batch::default();

        for key in accounts_tree.iter().keys() {
            let key =
                key.map_err(|e| ChainError::Database(format!("Failed to read account key: {e}")))?;
            if !state.exists(&Address::from_slice(key.as_ref())) {
                batch.remove(key);
            }
        }
        for (address, account) in state.accounts() {
            batch.insert(address.as_bytes(), serialize(account)?);
        }

        accounts_tree
            .apply_batch(batch)
            .map_err(|e| ChainError::Database(format!("Failed to write accounts: {e}")))?;
        self.db.flush()?;
        info!("Committed {} accounts to {}", state.len(), self.db_path.display());
        Ok(())
    }

    pub fn head_number(&self) -> Result<Option<u64>> {
        let meta = self.tree(META_TREE)?;
        match meta.get(HEAD_NUMBER_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_ref().try_into().map_err(|_| {
                    ChainError::Database(format!("Corrupt head number: {} bytes", bytes.len()))
                })?;
                Ok(Some(u64::from_be_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    pub fn set_head_number(&self, number: u64) -> Result<()> {
        let meta = self.tree(META_TREE)?;
        meta.insert(HEAD_NUMBER_KEY, number.to_be_bytes().to_vec())?;
        Ok(())
    }

    pub fn chain_config(&self) -> Result<Option<ChainConfig>> {
        let meta = self.tree(META_TREE)?;
        meta.get(CHAIN_CONFIG_KEY)?
            .map(|bytes| deserialize(bytes.as_ref()))
            .transpose()
    }

    pub fn set_chain_config(&self, config: &ChainConfig) -> Result<()> {
        let meta = self.tree(META_TREE)?;
        meta.insert(CHAIN_CONFIG_KEY, serialize(config)?)?;
        Ok(())
    }

    pub fn store_receipts(&self, number: u64, receipts: &[Receipt]) -> Result<()> {
        let receipts_tree = self.tree(RECEIPTS_TREE)?;
        receipts_tree.insert(number.to_be_bytes(), serialize(&receipts)?)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn receipts(&self, number: u64) -> Result<Option<Vec<Receipt>>> {
        let receipts_tree = self.tree(RECEIPTS_TREE)?;
        receipts_tree
            .get(number.to_be_bytes())?
            .map(|bytes| deserialize(bytes.as_ref()))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::{classify, mark_role, AddressRole};
    use crate::core::types::Hash;
    use crate::testnet::{addr, create_temp_dir, funded_state};
    use num_bigint::BigUint;

    #[test]
    fn test_state_survives_reopen() {
        let dir = create_temp_dir().unwrap();
        let path = dir.path().join("state");

        let mut state = funded_state(addr(1), 500);
        state.set_nonce(&addr(1), 3);
        state.set_code(&addr(2), vec![0x60, 0x00]);
        mark_role(&mut state, &addr(2), AddressRole::Template);
        {
            let store = StateStore::open(&path).unwrap();
            store.commit_state(&state).unwrap();
            store.set_head_number(4).unwrap();
        }

        let store = StateStore::open(&path).unwrap();
        let loaded = store.load_state().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.balance(&addr(1)), BigUint::from(500u32));
        assert_eq!(classify(&loaded, &addr(2)), AddressRole::Template);
        assert_eq!(store.head_number().unwrap(), Some(4));
    }

    #[test]
    fn test_commit_replaces_accounts() {
        let dir = create_temp_dir().unwrap();
        let store = StateStore::open(dir.path().join("state")).unwrap();

        store.commit_state(&funded_state(addr(1), 1)).unwrap();
        store.commit_state(&funded_state(addr(2), 2)).unwrap();

        let loaded = store.load_state().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.exists(&addr(1)));
    }

    #[test]
    fn test_receipts_and_config() {
        let dir = create_temp_dir().unwrap();
        let store = StateStore::open(dir.path().join("state")).unwrap();
        assert_eq!(store.head_number().unwrap(), None);
        assert_eq!(store.chain_config().unwrap(), None);
        assert_eq!(store.receipts(1).unwrap(), None);

        let config = ChainConfig {
            homestead_block: None,
            block_gas_limit: 8_000_000,
        };
        store.set_chain_config(&config).unwrap();
        assert_eq!(store.chain_config().unwrap(), Some(config));

        let receipts = vec![Receipt {
            tx_hash: Hash([7; 32]),
            failed: true,
            gas_used: 21_000,
            cumulative_gas_used: 21_000,
            return_data: vec![1, 2],
        }];
        store.store_receipts(1, &receipts).unwrap();
        assert_eq!(store.receipts(1).unwrap(), Some(receipts));
    }
}
