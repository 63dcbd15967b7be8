use crate::core::params::DEFAULT_BLOCK_GAS_LIMIT;
use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};

/// Consensus parameters every node on the chain must agree on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// First block where creation pays the higher base cost. `None` keeps it off.
    pub homestead_block: Option<u64>,
    pub block_gas_limit: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            homestead_block: Some(0),
            block_gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
        }
    }
}

impl ChainConfig {
    pub fn is_homestead(&self, number: u64) -> bool {
        matches!(self.homestead_block, Some(block) if number >= block)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_gas_limit == 0 {
            return Err(ChainError::Config(
                "Block gas limit cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<ChainConfig> {
        let config: ChainConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
