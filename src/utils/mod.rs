//! Utility functions and helpers
//!
//! Hashing, the bincode encoding used for hashes and persistence, and the serde
//! helpers that keep fixtures human-readable.

pub mod crypto;
pub mod serialization;

pub use crypto::sha256_digest;

pub use serialization::{deserialize, serialize};
