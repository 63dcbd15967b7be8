//! Error handling for the state-transition engine
//!
//! Errors fall into two groups. Consensus errors mean the transaction can never be
//! included in the block being built. Everything else is infrastructure (database,
//! configuration, encoding) and says nothing about the transaction itself.
//!
//! Execution failures inside the backend are not errors at this level: they are
//! reported through [`crate::core::VmError`] and end up in the receipt's `failed` flag.

use crate::core::{AddressRole, TxKind};
use num_bigint::BigUint;
use std::fmt;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Account nonce is lower than the transaction nonce
    NonceTooHigh { state: u64, tx: u64 },
    /// Account nonce is higher than the transaction nonce
    NonceTooLow { state: u64, tx: u64 },
    /// Sender cannot cover `gas_limit * gas_price`
    InsufficientBalanceForGas {
        required: BigUint,
        available: BigUint,
    },
    /// Gas limit does not fit in 64 bits
    GasLimitOverflow,
    /// The block gas pool cannot cover the requested gas
    GasLimitReached { requested: u64, available: u64 },
    /// Intrinsic gas computation overflowed
    IntrinsicGasOverflow,
    /// Working gas budget exhausted
    OutOfGas { requested: u64, remaining: u64 },
    /// First value transfer of a message could not be paid
    InsufficientBalance,
    /// Transaction kind not allowed for the recipient's role
    InvalidType { role: Option<AddressRole>, kind: TxKind },
    /// Governance transaction carried a payload
    InvalidInput { kind: TxKind },
    /// Database-related errors
    Database(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Invalid address format
    InvalidAddress(String),
}

impl ChainError {
    /// True when the error rejects the transaction from the block.
    pub fn is_consensus(&self) -> bool {
        !matches!(
            self,
            ChainError::Database(_)
                | ChainError::Serialization(_)
                | ChainError::Config(_)
                | ChainError::Io(_)
                | ChainError::InvalidAddress(_)
        )
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::NonceTooHigh { state, tx } => {
                write!(f, "nonce too high: account {state}, transaction {tx}")
            }
            ChainError::NonceTooLow { state, tx } => {
                write!(f, "nonce too low: account {state}, transaction {tx}")
            }
            ChainError::InsufficientBalanceForGas {
                required,
                available,
            } => write!(
                f,
                "insufficient balance to pay for gas: required {required}, available {available}"
            ),
            ChainError::GasLimitOverflow => write!(f, "gas limit exceeds 64 bits"),
            ChainError::GasLimitReached {
                requested,
                available,
            } => write!(
                f,
                "gas limit reached: requested {requested}, pool has {available}"
            ),
            ChainError::IntrinsicGasOverflow => write!(f, "intrinsic gas overflow"),
            ChainError::OutOfGas {
                requested,
                remaining,
            } => write!(f, "out of gas: requested {requested}, remaining {remaining}"),
            ChainError::InsufficientBalance => write!(f, "insufficient balance for transfer"),
            ChainError::InvalidType { role, kind } => match role {
                Some(role) => write!(f, "invalid transaction type {kind} for {role} address"),
                None => write!(f, "invalid transaction type {kind} for contract creation"),
            },
            ChainError::InvalidInput { kind } => {
                write!(f, "invalid input: {kind} transaction must not carry data")
            }
            ChainError::Database(msg) => write!(f, "Database error: {msg}"),
            ChainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            ChainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            ChainError::Io(msg) => write!(f, "I/O error: {msg}"),
            ChainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<sled::Error> for ChainError {
    fn from(err: sled::Error) -> Self {
        ChainError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for ChainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for ChainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consensus_classification() {
        assert!(ChainError::NonceTooLow { state: 2, tx: 1 }.is_consensus());
        assert!(ChainError::GasLimitOverflow.is_consensus());
        assert!(ChainError::InsufficientBalance.is_consensus());
        assert!(ChainError::InvalidInput {
            kind: TxKind::Delegate
        }
        .is_consensus());
        assert!(!ChainError::Database("closed".to_string()).is_consensus());
        assert!(!ChainError::Config("bad".to_string()).is_consensus());
    }

    #[test]
    fn test_display_messages() {
        let err = ChainError::InsufficientBalanceForGas {
            required: BigUint::from(100u32),
            available: BigUint::from(7u32),
        };
        assert_eq!(
            err.to_string(),
            "insufficient balance to pay for gas: required 100, available 7"
        );

        let err = ChainError::InvalidType {
            role: Some(AddressRole::Contract),
            kind: TxKind::Delegate,
        };
        assert_eq!(
            err.to_string(),
            "invalid transaction type delegate for contract address"
        );
    }
}
