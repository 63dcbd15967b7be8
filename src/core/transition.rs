//! The state transition
//!
//! Applying one transaction to the world state:
//!
//! 1. Nonce check (when the message asks for it): exact match required
//! 2. Gas purchase from the sender's balance and the block gas pool
//! 3. Recipient classification, then the intrinsic gas charge
//! 4. Dispatch on recipient role and transaction kind into the execution backend
//! 5. Refund of unused gas, then the fee split between proposer and beneficiary
//!
//! A consensus error at any step aborts the transition. Nothing is rolled back:
//! once gas is bought the sender has paid for it. Execution errors other than an
//! unpayable first transfer do not abort; the result is reported as failed.

use crate::core::block::BlockContext;
use crate::core::classifier::{classify, AddressRole};
use crate::core::dispatch::{decide, execute, Invocation};
use crate::core::gas::{intrinsic_gas, GasMeter, GasPool};
use crate::core::reward::{distribute, FeeSplit};
use crate::core::state::WorldState;
use crate::core::types::{Address, Hash, Message, TxKind};
use crate::core::vm::{ExecutionBackend, VmError};
use crate::error::{ChainError, Result};
use log::debug;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStage {
    Init,
    PreChecked,
    GasPurchased,
    Dispatched,
    Rewarded,
    Done,
    Failed,
}

impl fmt::Display for TransitionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Externally visible result of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub return_data: Vec<u8>,
    /// Gas used before the refund counter was applied
    pub gas_required: u64,
    /// Gas paid for, after refunds
    pub gas_used: u64,
    /// Execution failed but the transaction is still valid
    pub failed: bool,
    pub vm_error: Option<VmError>,
    /// Refund counter credit applied on top of unused gas
    pub refund: u64,
    pub fees: FeeSplit,
}

/// One transaction's worth of state transition. Consumed by [`StateTransition::transition_db`].
pub struct StateTransition<'a, S: WorldState, B: ExecutionBackend> {
    msg: &'a Message,
    kind: TxKind,
    tx_hash: Hash,
    pool: &'a mut GasPool,
    state: &'a mut S,
    backend: &'a mut B,
    block: &'a BlockContext,
    meter: GasMeter,
    stage: TransitionStage,
}

impl<'a, S: WorldState, B: ExecutionBackend> StateTransition<'a, S, B> {
    pub fn new(
        msg: &'a Message,
        kind: TxKind,
        tx_hash: Hash,
        pool: &'a mut GasPool,
        state: &'a mut S,
        backend: &'a mut B,
        block: &'a BlockContext,
    ) -> StateTransition<'a, S, B> {
        StateTransition {
            msg,
            kind,
            tx_hash,
            pool,
            state,
            backend,
            block,
            meter: GasMeter::new(msg.gas_price.clone()),
            stage: TransitionStage::Init,
        }
    }

    pub fn stage(&self) -> TransitionStage {
        self.stage
    }

    fn advance(&mut self, stage: TransitionStage) {
        debug!("Transition {}: {} -> {stage}", self.tx_hash, self.stage);
        self.stage = stage;
    }

    /// The sender account, created on first sight
    fn sender(&mut self) -> Address {
        let from = self.msg.from;
        if !self.state.exists(&from) {
            self.state.create_account(&from);
        }
        from
    }

    fn pre_check(&mut self) -> Result<()> {
        let sender = self.sender();
        if self.msg.check_nonce {
            let nonce = self.state.nonce(&sender);
            if nonce < self.msg.nonce {
                return Err(ChainError::NonceTooHigh {
                    state: nonce,
                    tx: self.msg.nonce,
                });
            } else if nonce > self.msg.nonce {
                return Err(ChainError::NonceTooLow {
                    state: nonce,
                    tx: self.msg.nonce,
                });
            }
        }
        self.advance(TransitionStage::PreChecked);

        self.meter
            .buy_gas(&mut *self.state, self.pool, &sender, &self.msg.gas_limit)?;
        self.advance(TransitionStage::GasPurchased);
        Ok(())
    }

    /// Run the transition to completion. The state's refund counter and error slot are
    /// reset first, so nothing left by an earlier transition carries over.
    pub fn transition_db(mut self) -> Result<ExecutionResult> {
        match self.run() {
            Ok(result) => {
                self.advance(TransitionStage::Done);
                Ok(result)
            }
            Err(err) => {
                debug!(
                    "Transition {} failed after {}: {err}",
                    self.tx_hash, self.stage
                );
                self.stage = TransitionStage::Failed;
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<ExecutionResult> {
        self.state.prepare_transition();
        self.pre_check()?;
        let sender = self.sender();
        let homestead = self.block.is_homestead();

        // Classified once; the same role drives dispatch and the fee split.
        let role = if self.msg.is_creation() {
            None
        } else {
            self.msg.to.map(|to| classify(&*self.state, &to))
        };
        let contract_creation = matches!(role, None | Some(AddressRole::Template));

        let intrinsic = intrinsic_gas(&self.msg.data, contract_creation, homestead)?;
        self.meter.use_gas(intrinsic)?;

        let action = decide(role, self.kind, &self.msg.data)?;
        let invocation = Invocation {
            sender,
            recipient: self.msg.to,
            kind: self.kind,
            payload: &self.msg.data,
            value: &self.msg.value,
            gas: self.meter.remaining(),
            validators: &self.block.validators,
            tx_hash: self.tx_hash,
        };
        let outcome = execute(action, &mut *self.state, &mut *self.backend, &invocation)?;
        self.meter.settle(outcome.gas_left);

        if let Some(err) = &outcome.error {
            debug!("Backend returned with error: {err}");
            // The first balance transfer may never fail.
            if *err == VmError::InsufficientBalance {
                return Err(ChainError::InsufficientBalance);
            }
        }
        // Nested debits report through the backend's own result, never here.
        if let Some(err) = self.state.last_error() {
            debug!("State recorded during execution: {err}");
        }
        self.advance(TransitionStage::Dispatched);

        let gas_required = self.meter.gas_used();
        let refund = self
            .meter
            .refund_gas(&mut *self.state, self.pool, &sender);
        let fees = distribute(
            &mut *self.state,
            role,
            self.msg.to.as_ref(),
            &self.block.coinbase,
            self.meter.gas_used(),
            self.meter.price(),
        );
        self.advance(TransitionStage::Rewarded);

        Ok(ExecutionResult {
            return_data: outcome.output,
            gas_required,
            gas_used: self.meter.gas_used(),
            failed: outcome.error.is_some(),
            vm_error: outcome.error,
            refund,
            fees,
        })
    }
}

/// Apply `msg` against `state` and return the result.
#[allow(clippy::too_many_arguments)]
pub fn apply_message<S: WorldState, B: ExecutionBackend>(
    msg: &Message,
    kind: TxKind,
    tx_hash: Hash,
    pool: &mut GasPool,
    state: &mut S,
    backend: &mut B,
    block: &BlockContext,
) -> Result<ExecutionResult> {
    StateTransition::new(msg, kind, tx_hash, pool, state, backend, block).transition_db()
}
