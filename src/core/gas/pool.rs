use crate::error::{ChainError, Result};
use std::fmt;

/// Gas still available to the block being built or processed.
///
/// Transactions of one block draw from and return to the same pool in block order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasPool {
    gas: u64,
}

impl GasPool {
    pub fn new(gas: u64) -> GasPool {
        GasPool { gas }
    }

    pub fn gas(&self) -> u64 {
        self.gas
    }

    /// Make `amount` available again
    pub fn add_gas(&mut self, amount: u64) {
        self.gas = self.gas.saturating_add(amount);
    }

    /// Take `amount` out of the pool. On failure the pool is unchanged.
    pub fn sub_gas(&mut self, amount: u64) -> Result<()> {
        if self.gas < amount {
            return Err(ChainError::GasLimitReached {
                requested: amount,
                available: self.gas,
            });
        }
        self.gas -= amount;
        Ok(())
    }
}

impl fmt::Display for GasPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_and_add() {
        let mut pool = GasPool::new(100_000);
        pool.sub_gas(21_000).unwrap();
        assert_eq!(pool.gas(), 79_000);
        pool.add_gas(1_000);
        assert_eq!(pool.gas(), 80_000);
    }

    #[test]
    fn test_exhausted_pool_is_untouched() {
        let mut pool = GasPool::new(30_000);
        let err = pool.sub_gas(30_001).unwrap_err();
        assert_eq!(
            err,
            ChainError::GasLimitReached {
                requested: 30_001,
                available: 30_000
            }
        );
        assert_eq!(pool.gas(), 30_000);

        pool.sub_gas(30_000).unwrap();
        assert_eq!(pool.gas(), 0);
    }
}
