//! Core state transition functionality
//!
//! This module contains the account model, gas accounting, role/kind dispatch,
//! fee distribution and the per-transaction and per-block state transition.

pub mod block;
pub mod classifier;
pub mod dispatch;
pub mod gas;
pub mod params;
pub mod processor;
pub mod reward;
pub mod state;
pub mod transaction;
pub mod transition;
pub mod types;
pub mod vm;

pub use block::{BlockContext, Receipt};
pub use classifier::{classify, recorded_coinbase, AddressRole};
pub use dispatch::{decide, Action};
pub use gas::{intrinsic_gas, GasMeter, GasPool};
pub use processor::{BlockOutcome, BlockProcessor, RejectedTransaction};
pub use reward::{distribute, split_fee, FeeSplit};
pub use state::{Account, MemoryState, WorldState};
pub use transaction::Transaction;
pub use transition::{apply_message, ExecutionResult, StateTransition, TransitionStage};
pub use types::{Address, Hash, Message, TxKind};
pub use vm::{CallResult, CreateMode, ExecutionBackend, TransferBackend, VmError};
