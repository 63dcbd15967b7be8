use crate::core::gas::GasPool;
use crate::core::params::REFUND_QUOTIENT;
use crate::core::state::WorldState;
use crate::core::types::Address;
use crate::error::{ChainError, Result};
use log::debug;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Working gas budget of one transition.
///
/// `remaining <= initial` holds at every point: gas only enters through `buy_gas` and the
/// capped refund, and leaves through `use_gas` and `settle`.
#[derive(Debug, Clone)]
pub struct GasMeter {
    remaining: u64,
    initial: u64,
    price: BigUint,
}

impl GasMeter {
    pub fn new(price: BigUint) -> GasMeter {
        GasMeter {
            remaining: 0,
            initial: 0,
            price,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn initial(&self) -> u64 {
        self.initial
    }

    pub fn price(&self) -> &BigUint {
        &self.price
    }

    pub fn gas_used(&self) -> u64 {
        self.initial - self.remaining
    }

    /// Reserve `limit` gas from the block pool and pay for it from `sender`'s balance.
    pub fn buy_gas<S: WorldState + ?Sized>(
        &mut self,
        state: &mut S,
        pool: &mut GasPool,
        sender: &Address,
        limit: &BigUint,
    ) -> Result<()> {
        let gas = limit.to_u64().ok_or(ChainError::GasLimitOverflow)?;
        let cost = limit * &self.price;

        let balance = state.balance(sender);
        if balance < cost {
            return Err(ChainError::InsufficientBalanceForGas {
                required: cost,
                available: balance,
            });
        }
        pool.sub_gas(gas)?;

        self.remaining += gas;
        self.initial = gas;
        state.sub_balance(sender, &cost);
        debug!("Bought {gas} gas for {sender} at {}, pool left {pool}", self.price);
        Ok(())
    }

    pub fn use_gas(&mut self, amount: u64) -> Result<()> {
        if self.remaining < amount {
            return Err(ChainError::OutOfGas {
                requested: amount,
                remaining: self.remaining,
            });
        }
        self.remaining -= amount;
        Ok(())
    }

    /// Adopt the gas left over by execution. A backend cannot hand back more than it got.
    pub fn settle(&mut self, gas_left: u64) {
        self.remaining = gas_left.min(self.remaining);
    }

    /// Pay unused gas back to `sender` at the purchase price, add the refund counter capped
    /// at half the gas used, and return the final unused gas to the pool.
    ///
    /// Returns the refund applied on top of the unused gas.
    pub fn refund_gas<S: WorldState + ?Sized>(
        &mut self,
        state: &mut S,
        pool: &mut GasPool,
        sender: &Address,
    ) -> u64 {
        let unused = BigUint::from(self.remaining) * &self.price;
        state.add_balance(sender, &unused);

        let refund = (self.gas_used() / REFUND_QUOTIENT).min(state.refund());
        self.remaining += refund;
        state.add_balance(sender, &(BigUint::from(refund) * &self.price));

        pool.add_gas(self.remaining);
        debug!(
            "Returned {} gas to {sender} (refund {refund}), pool now {pool}",
            self.remaining
        );
        refund
    }
}
