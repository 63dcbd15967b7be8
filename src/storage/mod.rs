//! Data storage and persistence
//!
//! This module persists the world state and receipts between blocks and loads the
//! genesis allocation.

pub mod genesis;
pub mod state_store;

pub use genesis::{Genesis, GenesisAccount};
pub use state_store::StateStore;
