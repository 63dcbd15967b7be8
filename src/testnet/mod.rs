//! Test fixtures for state transition testing
//!
//! Funded in-memory states, short addresses, and a backend that records which
//! primitive the engine invoked.

pub mod test_utils;

pub use test_utils::*;
