use crate::config::ChainConfig;
use crate::core::Address;
use crate::error::{ChainError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_DATA_DIR: &str = "data";

const DATA_DIR_KEY: &str = "KOK_DATA_DIR";
const COINBASE_KEY: &str = "KOK_COINBASE";
const GAS_LIMIT_KEY: &str = "KOK_GAS_LIMIT";
const HOMESTEAD_BLOCK_KEY: &str = "KOK_HOMESTEAD_BLOCK";

const ENV_KEYS: [&str; 4] = [DATA_DIR_KEY, COINBASE_KEY, GAS_LIMIT_KEY, HOMESTEAD_BLOCK_KEY];

/// Node settings, seeded from the environment and adjustable at runtime
pub struct Config {
    inner: RwLock<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        let mut map = HashMap::new();
        for key in ENV_KEYS {
            if let Ok(value) = env::var(key) {
                map.insert(String::from(key), value);
            }
        }

        Config {
            inner: RwLock::new(map),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on config - this should never happen");
        inner.insert(String::from(key), value);
    }

    fn get_u64(&self, key: &str) -> Result<Option<u64>> {
        self.get(key)
            .map(|value| {
                value
                    .parse::<u64>()
                    .map_err(|e| ChainError::Config(format!("{key}={value}: {e}")))
            })
            .transpose()
    }

    /// Directory holding the state database
    pub fn get_data_dir(&self) -> PathBuf {
        self.get(DATA_DIR_KEY)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn set_data_dir(&self, dir: String) {
        self.set(DATA_DIR_KEY, dir);
    }

    /// Block proposer credited with fees
    pub fn get_coinbase(&self) -> Result<Option<Address>> {
        self.get(COINBASE_KEY)
            .map(|value| value.parse::<Address>())
            .transpose()
    }

    pub fn set_coinbase(&self, coinbase: &Address) {
        self.set(COINBASE_KEY, coinbase.to_string());
    }

    pub fn set_gas_limit(&self, gas_limit: u64) {
        self.set(GAS_LIMIT_KEY, gas_limit.to_string());
    }

    pub fn set_homestead_block(&self, block: u64) {
        self.set(HOMESTEAD_BLOCK_KEY, block.to_string());
    }

    /// `chain` with any gas-limit or homestead override from this config applied
    pub fn apply_overrides(&self, chain: ChainConfig) -> Result<ChainConfig> {
        let mut chain = chain;
        if let Some(gas_limit) = self.get_u64(GAS_LIMIT_KEY)? {
            chain.block_gas_limit = gas_limit;
        }
        if let Some(block) = self.get_u64(HOMESTEAD_BLOCK_KEY)? {
            chain.homestead_block = Some(block);
        }
        chain.validate()?;
        Ok(chain)
    }
}
