//! Test utilities for state transition testing

use crate::core::state::{MemoryState, WorldState};
use crate::core::types::{Address, Hash};
use crate::core::vm::{CallResult, CreateMode, ExecutionBackend, TransferBackend};
use crate::error::{ChainError, Result};
use num_bigint::BigUint;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(|e| ChainError::Io(e.to_string()))
}

/// Address with every byte set to `byte`
pub fn addr(byte: u8) -> Address {
    Address([byte; 20])
}

/// State holding a single account with `balance`
pub fn funded_state(address: Address, balance: u64) -> MemoryState {
    let mut state = MemoryState::new();
    state.add_balance(&address, &BigUint::from(balance));
    state
}

/// Backend primitive as seen by `RecordingBackend`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    Create {
        init_code: Vec<u8>,
        mode: CreateMode,
    },
    Call {
        to: Address,
        validators: Option<Vec<Address>>,
    },
    SourceInstall {
        to: Address,
    },
    Endorse {
        to: Address,
    },
}

/// Records every primitive, then either answers with a scripted result or hands the
/// call to a `TransferBackend`.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    inner: TransferBackend,
    scripted: Option<CallResult>,
    refund: u64,
    nested_debit: Option<(Address, BigUint)>,
    calls: Vec<Primitive>,
    tx_hashes: Vec<Hash>,
}

impl RecordingBackend {
    pub fn transferring() -> RecordingBackend {
        RecordingBackend::default()
    }

    pub fn scripted(result: CallResult) -> RecordingBackend {
        RecordingBackend {
            scripted: Some(result),
            ..RecordingBackend::default()
        }
    }

    /// Add `refund` to the state's refund counter on every primitive
    pub fn with_refund(mut self, refund: u64) -> Self {
        self.refund = refund;
        self
    }

    /// Debit `amount` from `from` inside every primitive, like a nested transfer
    pub fn with_nested_debit(mut self, from: Address, amount: u64) -> Self {
        self.nested_debit = Some((from, BigUint::from(amount)));
        self
    }

    pub fn calls(&self) -> &[Primitive] {
        &self.calls
    }

    pub fn tx_hashes(&self) -> &[Hash] {
        &self.tx_hashes
    }

    fn record(&mut self, state: &mut dyn WorldState, primitive: Primitive) -> Option<CallResult> {
        self.calls.push(primitive);
        if self.refund > 0 {
            state.add_refund(self.refund);
        }
        if let Some((from, amount)) = &self.nested_debit {
            state.sub_balance(from, amount);
        }
        self.scripted.clone()
    }
}

impl ExecutionBackend for RecordingBackend {
    fn create(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        init_code: &[u8],
        gas: u64,
        value: &BigUint,
        mode: CreateMode,
    ) -> CallResult {
        let primitive = Primitive::Create {
            init_code: init_code.to_vec(),
            mode,
        };
        match self.record(state, primitive) {
            Some(result) => result,
            None => self
                .inner
                .create(state, caller, init_code, gas, value, mode),
        }
    }

    fn call(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        to: Address,
        input: &[u8],
        gas: u64,
        value: &BigUint,
        validators: Option<&[Address]>,
    ) -> CallResult {
        let primitive = Primitive::Call {
            to,
            validators: validators.map(|v| v.to_vec()),
        };
        match self.record(state, primitive) {
            Some(result) => result,
            None => self
                .inner
                .call(state, caller, to, input, gas, value, validators),
        }
    }

    fn source_install(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        to: Address,
        input: &[u8],
        gas: u64,
        value: &BigUint,
        tx_hash: Hash,
    ) -> CallResult {
        self.tx_hashes.push(tx_hash);
        match self.record(state, Primitive::SourceInstall { to }) {
            Some(result) => result,
            None => self
                .inner
                .source_install(state, caller, to, input, gas, value, tx_hash),
        }
    }

    fn endorse(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        to: Address,
        input: &[u8],
        gas: u64,
        value: &BigUint,
        tx_hash: Hash,
    ) -> CallResult {
        self.tx_hashes.push(tx_hash);
        match self.record(state, Primitive::Endorse { to }) {
            Some(result) => result,
            None => self
                .inner
                .endorse(state, caller, to, input, gas, value, tx_hash),
        }
    }
}
