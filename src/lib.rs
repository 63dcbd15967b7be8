//! # kok-chain - Transaction State Transition Engine
//!
//! The deterministic core of a forked Ethereum-style chain: given a world state, a block
//! context and a transaction, decide whether the transaction is valid, charge gas, route it
//! to the right execution primitive and pay out the fees.
//!
//! ## What It Does
//! - **Account Classifier**: recovers an address's role (normal, contract, template) from
//!   a reserved storage slot
//! - **Gas Accountant**: intrinsic gas, the block gas pool, gas purchase and refunds
//! - **Dispatch Engine**: the role/kind decision table in front of the execution backend
//! - **Reward Distributor**: proposer and contract-beneficiary fee split
//! - **State Transition**: the per-transaction pipeline, and a block processor on top
//!
//! ## How the Code Is Organized
//! - `core/`: state model, gas, dispatch, rewards, transition and block processing
//! - `storage/`: sled-backed state store and genesis loading
//! - `config/`: chain parameters and process-wide settings
//! - `utils/`: hashing and serialization helpers
//! - `cli/`: command-line interface
//!
//! ## Where to Start Reading
//! 1. `core/transition.rs` for the per-transaction pipeline
//! 2. `core/dispatch.rs` for which transactions are allowed where
//! 3. `core/processor.rs` for how a block of transactions is applied

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{ChainConfig, Config, GLOBAL_CONFIG};
pub use core::{
    apply_message, Address, AddressRole, BlockContext, BlockOutcome, BlockProcessor,
    ExecutionBackend, ExecutionResult, GasPool, Hash, MemoryState, Message, Receipt,
    StateTransition, Transaction, TransferBackend, TxKind, VmError, WorldState,
};
pub use error::{ChainError, Result};
pub use storage::{Genesis, GenesisAccount, StateStore};
pub use utils::{deserialize, serialize, sha256_digest};
