use crate::config::ChainConfig;
use crate::core::types::{Address, Hash};
use crate::utils::serialization::hex_bytes;
use serde::{Deserialize, Serialize};

/// Block-level inputs every transition in the block shares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    pub number: u64,
    /// Block proposer, paid the (proposer share of the) fees
    pub coinbase: Address,
    pub gas_limit: u64,
    /// Validator set handed to calls into ordinary accounts
    pub validators: Vec<Address>,
    pub config: ChainConfig,
}

impl BlockContext {
    pub fn new(number: u64, coinbase: Address, config: ChainConfig) -> BlockContext {
        BlockContext {
            number,
            coinbase,
            gas_limit: config.block_gas_limit,
            validators: Vec::new(),
            config,
        }
    }

    pub fn with_validators(mut self, validators: Vec<Address>) -> Self {
        self.validators = validators;
        self
    }

    pub fn is_homestead(&self) -> bool {
        self.config.is_homestead(self.number)
    }
}

/// Outcome of an included transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: Hash,
    /// Execution failed; the fee was still charged
    pub failed: bool,
    pub gas_used: u64,
    pub cumulative_gas_used: u64,
    #[serde(with = "hex_bytes", default)]
    pub return_data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_takes_limit_from_config() {
        let config = ChainConfig {
            homestead_block: Some(3),
            block_gas_limit: 1_000_000,
        };
        let block = BlockContext::new(2, Address([1; 20]), config);
        assert_eq!(block.gas_limit, 1_000_000);
        assert!(!block.is_homestead());
        assert!(BlockContext::new(3, Address([1; 20]), config).is_homestead());
    }
}
