//! Block processing
//!
//! Applies a block's transactions in order against one gas pool sized to the block gas
//! limit. A transaction rejected with a consensus error is left out of the block: its
//! state changes are reverted through a state snapshot and the pool is restored.

use crate::core::block::{BlockContext, Receipt};
use crate::core::gas::GasPool;
use crate::core::state::WorldState;
use crate::core::transaction::Transaction;
use crate::core::transition::apply_message;
use crate::core::types::Hash;
use crate::core::vm::ExecutionBackend;
use crate::error::{ChainError, Result};
use log::{debug, info, warn};

/// A transaction that cannot enter the block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTransaction {
    pub tx_hash: Hash,
    pub error: ChainError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockOutcome {
    pub receipts: Vec<Receipt>,
    pub rejected: Vec<RejectedTransaction>,
    pub gas_used: u64,
    pub gas_pool_left: u64,
}

pub struct BlockProcessor {
    block: BlockContext,
}

impl BlockProcessor {
    pub fn new(block: BlockContext) -> BlockProcessor {
        BlockProcessor { block }
    }

    /// Apply `txs` in order. Only infrastructure errors abort the whole block.
    pub fn process<S, B>(
        &self,
        state: &mut S,
        backend: &mut B,
        txs: &[Transaction],
    ) -> Result<BlockOutcome>
    where
        S: WorldState,
        B: ExecutionBackend,
    {
        let mut pool = GasPool::new(self.block.gas_limit);
        let mut outcome = BlockOutcome::default();

        for tx in txs {
            let tx_hash = tx.hash()?;
            let msg = tx.as_message();

            debug!(
                "Applying {tx_hash} from {} (nonce {}, gas {} at {})",
                tx.get_from(),
                tx.get_nonce(),
                tx.get_gas_limit(),
                tx.get_gas_price()
            );
            let snapshot = state.snapshot();
            let pool_snapshot = pool;

            match apply_message(
                &msg,
                tx.get_kind(),
                tx_hash,
                &mut pool,
                &mut *state,
                &mut *backend,
                &self.block,
            ) {
                Ok(result) => {
                    state.discard_snapshot(snapshot);
                    outcome.gas_used += result.gas_used;
                    debug!(
                        "Included {tx_hash}: {} gas, failed: {}",
                        result.gas_used, result.failed
                    );
                    outcome.receipts.push(Receipt {
                        tx_hash,
                        failed: result.failed,
                        gas_used: result.gas_used,
                        cumulative_gas_used: outcome.gas_used,
                        return_data: result.return_data,
                    });
                }
                Err(error) if error.is_consensus() => {
                    warn!("Rejected {tx_hash}: {error}");
                    state.revert_to_snapshot(snapshot);
                    pool = pool_snapshot;
                    outcome
                        .rejected
                        .push(RejectedTransaction { tx_hash, error });
                }
                Err(error) => {
                    state.revert_to_snapshot(snapshot);
                    return Err(error);
                }
            }
        }

        outcome.gas_pool_left = pool.gas();
        info!(
            "Block {}: {} included, {} rejected, {} gas used, {} left in pool",
            self.block.number,
            outcome.receipts.len(),
            outcome.rejected.len(),
            outcome.gas_used,
            outcome.gas_pool_left
        );
        Ok(outcome)
    }
}
