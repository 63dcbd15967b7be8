// Bincode 2 over serde, standard configuration. Everything that gets hashed or
// persisted goes through these two functions so encodings never diverge.
use crate::error::{ChainError, Result};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use num_bigint::BigUint;
use serde::{de::DeserializeOwned, Serialize};

/// Serialize data using bincode 2.0 with standard configuration
pub fn serialize<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::serde::encode_to_vec(data, config)
        .map_err(|e| ChainError::Serialization(format!("Serialization failed: {e}")))
}

/// Deserialize data using bincode 2.0 with standard configuration
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let config = bincode::config::standard();
    let (data, _) = bincode::serde::decode_from_slice(bytes, config)
        .map_err(|e| ChainError::Serialization(format!("Deserialization failed: {e}")))?;
    Ok(data)
}

/// Decode `0x`-prefixed or bare hex, either case.
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    HEXLOWER_PERMISSIVE
        .decode(digits.as_bytes())
        .map_err(|e| ChainError::Serialization(format!("Invalid hex {text:?}: {e}")))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", HEXLOWER.encode(bytes))
}

/// Parse an amount written in decimal or `0x` hex.
pub fn parse_amount(text: &str) -> Result<BigUint> {
    let text = text.trim().replace('_', "");
    let parsed = match text.strip_prefix("0x") {
        Some(digits) => BigUint::parse_bytes(digits.as_bytes(), 16),
        None => BigUint::parse_bytes(text.as_bytes(), 10),
    };
    parsed.ok_or_else(|| ChainError::Serialization(format!("Invalid amount: {text:?}")))
}

/// `BigUint` as a decimal string. Human-readable formats also accept bare integers.
pub mod decimal {
    use super::parse_amount;
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = if deserializer.is_human_readable() {
            match Repr::deserialize(deserializer)? {
                Repr::Int(n) => return Ok(BigUint::from(n)),
                Repr::Text(text) => text,
            }
        } else {
            String::deserialize(deserializer)?
        };
        parse_amount(&text).map_err(de::Error::custom)
    }
}

/// Byte strings as `0x`-prefixed hex.
pub mod hex_bytes {
    use super::{decode_hex, encode_hex};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_hex(&text).map_err(de::Error::custom)
    }
}
