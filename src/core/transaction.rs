// A transaction as it sits in a block. Signature recovery happens before transactions
// reach the engine, so the sender is carried explicitly.

use crate::core::types::{Address, Hash, Message, TxKind};
use crate::error::Result;
use crate::utils::serialization::{decimal, hex_bytes};
use crate::utils::{serialize, sha256_digest};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    from: Address,
    #[serde(default)]
    to: Option<Address>,
    nonce: u64,
    #[serde(with = "decimal")]
    gas_limit: BigUint,
    #[serde(with = "decimal")]
    gas_price: BigUint,
    #[serde(with = "decimal", default)]
    value: BigUint,
    #[serde(with = "hex_bytes", default)]
    data: Vec<u8>,
    kind: TxKind,
}

impl Transaction {
    pub fn new(from: Address, to: Option<Address>, nonce: u64, kind: TxKind) -> Transaction {
        Transaction {
            from,
            to,
            nonce,
            gas_limit: BigUint::default(),
            gas_price: BigUint::default(),
            value: BigUint::default(),
            data: Vec::new(),
            kind,
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

    /// SHA-256 of the bincode encoding
    pub fn hash(&self) -> Result<Hash> {
        let encoded = serialize(self)?;
        Ok(Hash::from_slice(&sha256_digest(&encoded)))
    }

    /// Message view with nonce checking enabled
    pub fn as_message(&self) -> Message {
        Message {
            from: self.from,
            to: self.to,
            gas_limit: self.gas_limit.clone(),
            gas_price: self.gas_price.clone(),
            value: self.value.clone(),
            data: self.data.clone(),
            nonce: self.nonce,
            check_nonce: true,
        }
    }

    pub fn get_from(&self) -> &Address {
        &self.from
    }

    pub fn get_to(&self) -> Option<&Address> {
        self.to.as_ref()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_kind(&self) -> TxKind {
        self.kind
    }

    pub fn get_gas_limit(&self) -> &BigUint {
        &self.gas_limit
    }

    pub fn get_gas_price(&self) -> &BigUint {
        &self.gas_price
    }

    pub fn get_value(&self) -> &BigUint {
        &self.value
    }

    pub fn get_data(&self) -> &[u8] {
        &self.data
    }
}
