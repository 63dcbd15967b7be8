// Primitive chain types shared by every part of the engine: addresses, 32-byte
// words, transaction kinds and the message view a transition runs on.

use crate::error::{ChainError, Result};
use crate::utils::serialization::{decimal, decode_hex, encode_hex, hex_bytes};
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LENGTH: usize = 20;
pub const HASH_LENGTH: usize = 32;

/// 20-byte account address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

/// 32-byte word: storage keys, storage values and transaction hashes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash(pub [u8; HASH_LENGTH]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Take the last 20 bytes of `bytes`, left-padding with zeros when shorter.
    pub fn from_slice(bytes: &[u8]) -> Address {
        let mut address = [0u8; ADDRESS_LENGTH];
        let take = bytes.len().min(ADDRESS_LENGTH);
        address[ADDRESS_LENGTH - take..].copy_from_slice(&bytes[bytes.len() - take..]);
        Address(address)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Hash {
    pub const ZERO: Hash = Hash([0u8; HASH_LENGTH]);

    /// Take the last 32 bytes of `bytes`, left-padding with zeros when shorter.
    pub fn from_slice(bytes: &[u8]) -> Hash {
        let mut hash = [0u8; HASH_LENGTH];
        let take = bytes.len().min(HASH_LENGTH);
        hash[HASH_LENGTH - take..].copy_from_slice(&bytes[bytes.len() - take..]);
        Hash(hash)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LENGTH]
    }
}

impl From<Address> for Hash {
    fn from(address: Address) -> Self {
        Hash::from_slice(&address.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex(&self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex(&self.0))
    }
}

impl FromStr for Address {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_hex(s).map_err(|_| ChainError::InvalidAddress(s.to_string()))?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(ChainError::InvalidAddress(format!(
                "{s}: expected {ADDRESS_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Address::from_slice(&bytes))
    }
}

impl FromStr for Hash {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        if bytes.len() > HASH_LENGTH {
            return Err(ChainError::Serialization(format!(
                "{s}: longer than {HASH_LENGTH} bytes"
            )));
        }
        Ok(Hash::from_slice(&bytes))
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(de::Error::custom)
            }
        }
    };
}

hex_serde!(Address);
hex_serde!(Hash);

/// Transaction kind, fixed at signing time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// Direct bytecode call or template instantiation
    Binary,
    /// Install or execute source code
    SourceCode,
    /// Endorsement-style call
    Endorse,
    LoginCandidate,
    LogoutCandidate,
    Delegate,
    UnDelegate,
}

impl TxKind {
    pub const ALL: [TxKind; 7] = [
        TxKind::Binary,
        TxKind::SourceCode,
        TxKind::Endorse,
        TxKind::LoginCandidate,
        TxKind::LogoutCandidate,
        TxKind::Delegate,
        TxKind::UnDelegate,
    ];

    /// Zero-payload governance calls
    pub fn is_governance(&self) -> bool {
        matches!(
            self,
            TxKind::LoginCandidate | TxKind::LogoutCandidate | TxKind::Delegate | TxKind::UnDelegate
        )
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxKind::Binary => "binary",
            TxKind::SourceCode => "source_code",
            TxKind::Endorse => "endorse",
            TxKind::LoginCandidate => "login_candidate",
            TxKind::LogoutCandidate => "logout_candidate",
            TxKind::Delegate => "delegate",
            TxKind::UnDelegate => "un_delegate",
        };
        f.write_str(name)
    }
}

impl FromStr for TxKind {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        TxKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s.to_lowercase())
            .ok_or_else(|| ChainError::Config(format!("Invalid transaction kind: {s}")))
    }
}

/// The transaction as seen by the state transition. Immutable for the duration of one
/// transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: Address,
    /// `None` deploys a template
    pub to: Option<Address>,
    #[serde(with = "decimal")]
    pub gas_limit: BigUint,
    #[serde(with = "decimal")]
    pub gas_price: BigUint,
    #[serde(with = "decimal")]
    pub value: BigUint,
    #[serde(with = "hex_bytes", default)]
    pub data: Vec<u8>,
    pub nonce: u64,
    pub check_nonce: bool,
}

impl Message {
    pub fn new(from: Address, to: Option<Address>, nonce: u64) -> Message {
        Message {
            from,
            to,
            gas_limit: BigUint::default(),
            gas_price: BigUint::default(),
            value: BigUint::default(),
            data: Vec::new(),
            nonce,
            check_nonce: true,
        }
    }

    pub fn with_gas(mut self, gas_limit: impl Into<BigUint>, gas_price: impl Into<BigUint>) -> Self {
        self.gas_limit = gas_limit.into();
        self.gas_price = gas_price.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<BigUint>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn without_nonce_check(mut self) -> Self {
        self.check_nonce = false;
        self
    }

    pub fn is_creation(&self) -> bool {
        self.to.is_none()
    }
}
