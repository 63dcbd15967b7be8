// Execution backend seam. The state transition decides *what* to run; a backend
// decides *how*. Backends get the world state passed in explicitly so the engine keeps
// sole ownership of it between calls.

use crate::core::classifier::{mark_role, record_coinbase, tag_key, AddressRole};
use crate::core::params::CREATE_DATA_GAS;
use crate::core::state::WorldState;
use crate::core::types::{Address, Hash, ADDRESS_LENGTH};
use crate::utils::sha256_digest;
use log::debug;
use num_bigint::BigUint;
use std::fmt;

/// Slot where `TransferBackend` records the last source-install transaction
pub const SOURCE_TAG: &str = "source";
/// Slot where `TransferBackend` records the last endorsement transaction
pub const ENDORSE_TAG: &str = "endorse";

/// Execution failures. Apart from `InsufficientBalance` on the first transfer these
/// never reject a transaction: it is included, charged, and marked failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    InsufficientBalance,
    OutOfGas,
    Reverted(String),
    InvalidCode(String),
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::InsufficientBalance => write!(f, "insufficient balance for transfer"),
            VmError::OutOfGas => write!(f, "out of gas"),
            VmError::Reverted(reason) => write!(f, "execution reverted: {reason}"),
            VmError::InvalidCode(reason) => write!(f, "invalid code: {reason}"),
        }
    }
}

impl std::error::Error for VmError {}

/// Which creation flavour `create` performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Store not-yet-instantiated code at a fresh template address
    Template,
    /// Instantiate a template; the init code ends with the recorded coinbase and the
    /// template address (20 bytes each)
    Contract,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallResult {
    pub output: Vec<u8>,
    pub gas_left: u64,
    pub error: Option<VmError>,
}

impl CallResult {
    pub fn ok(output: Vec<u8>, gas_left: u64) -> CallResult {
        CallResult {
            output,
            gas_left,
            error: None,
        }
    }

    pub fn failed(error: VmError, gas_left: u64) -> CallResult {
        CallResult {
            output: Vec::new(),
            gas_left,
            error: Some(error),
        }
    }
}

pub trait ExecutionBackend {
    fn create(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        init_code: &[u8],
        gas: u64,
        value: &BigUint,
        mode: CreateMode,
    ) -> CallResult;

    /// `validators` is `Some` for calls into ordinary accounts, where governance
    /// transactions land.
    #[allow(clippy::too_many_arguments)]
    fn call(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        to: Address,
        input: &[u8],
        gas: u64,
        value: &BigUint,
        validators: Option<&[Address]>,
    ) -> CallResult;

    #[allow(clippy::too_many_arguments)]
    fn source_install(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        to: Address,
        input: &[u8],
        gas: u64,
        value: &BigUint,
        tx_hash: Hash,
    ) -> CallResult;

    #[allow(clippy::too_many_arguments)]
    fn endorse(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        to: Address,
        input: &[u8],
        gas: u64,
        value: &BigUint,
        tx_hash: Hash,
    ) -> CallResult;
}

/// Address of the account `caller` creates with account nonce `nonce`
pub fn create_address(caller: &Address, nonce: u64) -> Address {
    let mut preimage = caller.as_bytes().to_vec();
    preimage.extend(nonce.to_be_bytes());
    Address::from_slice(&sha256_digest(&preimage))
}

/// Backend without a code interpreter: it moves value, stores code and keeps the role
/// markers up to date. Used by the command line and the integration tests.
#[derive(Debug, Clone, Default)]
pub struct TransferBackend;

impl TransferBackend {
    pub fn new() -> TransferBackend {
        TransferBackend
    }

    fn can_transfer(state: &dyn WorldState, from: &Address, value: &BigUint) -> bool {
        state.balance(from) >= *value
    }

    fn transfer(state: &mut dyn WorldState, from: &Address, to: &Address, value: &BigUint) {
        if !state.exists(to) {
            state.create_account(to);
        }
        state.sub_balance(from, value);
        state.add_balance(to, value);
    }

    fn code_cost(len: usize) -> Option<u64> {
        (len as u64).checked_mul(CREATE_DATA_GAS)
    }
}

impl ExecutionBackend for TransferBackend {
    fn create(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        init_code: &[u8],
        gas: u64,
        value: &BigUint,
        mode: CreateMode,
    ) -> CallResult {
        if !Self::can_transfer(state, &caller, value) {
            return CallResult::failed(VmError::InsufficientBalance, gas);
        }

        let (code, beneficiary) = match mode {
            CreateMode::Template => (init_code, caller),
            CreateMode::Contract => {
                let trailer = 2 * ADDRESS_LENGTH;
                if init_code.len() < trailer {
                    return CallResult::failed(
                        VmError::InvalidCode(format!(
                            "template init code shorter than {trailer} bytes"
                        )),
                        gas,
                    );
                }
                let split = init_code.len() - trailer;
                let coinbase = Address::from_slice(&init_code[split..split + ADDRESS_LENGTH]);
                (&init_code[..split], coinbase)
            }
        };

        let nonce = state.nonce(&caller);
        state.set_nonce(&caller, nonce.wrapping_add(1));
        let address = create_address(&caller, nonce);

        let cost = match Self::code_cost(code.len()) {
            Some(cost) if cost <= gas => cost,
            _ => return CallResult::failed(VmError::OutOfGas, 0),
        };

        Self::transfer(state, &caller, &address, value);
        state.set_code(&address, code.to_vec());
        let role = match mode {
            CreateMode::Template => AddressRole::Template,
            CreateMode::Contract => AddressRole::Contract,
        };
        mark_role(state, &address, role);
        record_coinbase(state, &address, &beneficiary);
        debug!("Created {role} {address} ({} code bytes)", code.len());

        CallResult::ok(address.as_bytes().to_vec(), gas - cost)
    }

    fn call(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        to: Address,
        _input: &[u8],
        gas: u64,
        value: &BigUint,
        validators: Option<&[Address]>,
    ) -> CallResult {
        if !Self::can_transfer(state, &caller, value) {
            return CallResult::failed(VmError::InsufficientBalance, gas);
        }
        Self::transfer(state, &caller, &to, value);
        if let Some(validators) = validators {
            debug!("Call {caller} -> {to} with {} validators", validators.len());
        }
        CallResult::ok(Vec::new(), gas)
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
        if !Self::can_transfer(state, &caller, value) {
            return CallResult::failed(VmError::InsufficientBalance, gas);
        }
        let cost = match Self::code_cost(input.len()) {
            Some(cost) if cost <= gas => cost,
            _ => return CallResult::failed(VmError::OutOfGas, 0),
        };
        Self::transfer(state, &caller, &to, value);
        state.set_storage(&to, tag_key(SOURCE_TAG), tx_hash);
        CallResult::ok(Vec::new(), gas - cost)
    }

    fn endorse(
        &mut self,
        state: &mut dyn WorldState,
        caller: Address,
        to: Address,
        _input: &[u8],
        gas: u64,
        value: &BigUint,
        tx_hash: Hash,
    ) -> CallResult {
        if !Self::can_transfer(state, &caller, value) {
            return CallResult::failed(VmError::InsufficientBalance, gas);
        }
        Self::transfer(state, &caller, &to, value);
        state.set_storage(&to, tag_key(ENDORSE_TAG), tx_hash);
        CallResult::ok(Vec::new(), gas)
    }
}
