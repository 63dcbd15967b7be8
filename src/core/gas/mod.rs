//! Gas accounting for a single transition and for the block it belongs to
//!
//! - `intrinsic`: the fixed, size-dependent charge taken before any execution
//! - `pool`: the per-block budget shared by every transaction in the block
//! - `meter`: the working budget of one transition (purchase, spend, refund)

pub mod intrinsic;
pub mod meter;
pub mod pool;

pub use intrinsic::intrinsic_gas;
pub use meter::GasMeter;
pub use pool::GasPool;
