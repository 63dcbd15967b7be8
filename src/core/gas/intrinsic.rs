use crate::core::params::{
    TX_DATA_NON_ZERO_GAS, TX_DATA_ZERO_GAS, TX_GAS, TX_GAS_CONTRACT_CREATION,
};
use crate::error::{ChainError, Result};

/// Gas charged before execution starts.
///
/// Creation pays the higher base cost only once homestead is active. Every payload byte
/// is charged at the zero or non-zero rate.
pub fn intrinsic_gas(data: &[u8], contract_creation: bool, homestead: bool) -> Result<u64> {
    let base = if contract_creation && homestead {
        TX_GAS_CONTRACT_CREATION
    } else {
        TX_GAS
    };
    if data.is_empty() {
        return Ok(base);
    }

    let non_zero = data.iter().filter(|byte| **byte != 0).count() as u64;
    let zero = data.len() as u64 - non_zero;
    payload_gas(base, non_zero, zero)
}

// base + non_zero * 68 + zero * 4, failing instead of wrapping
fn payload_gas(base: u64, non_zero: u64, zero: u64) -> Result<u64> {
    non_zero
        .checked_mul(TX_DATA_NON_ZERO_GAS)
        .and_then(|gas| gas.checked_add(base))
        .and_then(|gas| {
            zero.checked_mul(TX_DATA_ZERO_GAS)
                .and_then(|zero_gas| gas.checked_add(zero_gas))
        })
        .ok_or(ChainError::IntrinsicGasOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_pays_base_only() {
        assert_eq!(intrinsic_gas(&[], false, true).unwrap(), TX_GAS);
        assert_eq!(
            intrinsic_gas(&[], true, true).unwrap(),
            TX_GAS_CONTRACT_CREATION
        );
    }

    #[test]
    fn test_creation_cost_needs_homestead() {
        assert_eq!(intrinsic_gas(&[], true, false).unwrap(), TX_GAS);
    }

    #[test]
    fn test_zero_and_non_zero_bytes() {
        let data = [0u8, 1, 0, 0xff, 0];
        let expected = TX_GAS + 2 * TX_DATA_NON_ZERO_GAS + 3 * TX_DATA_ZERO_GAS;
        assert_eq!(intrinsic_gas(&data, false, true).unwrap(), expected);
        assert_eq!(expected, 21_148);
    }

    #[test]
    fn test_payload_gas_overflow() {
        let max_non_zero = (u64::MAX - TX_GAS) / TX_DATA_NON_ZERO_GAS;
        assert_eq!(
            payload_gas(TX_GAS, max_non_zero, 0).unwrap(),
            TX_GAS + max_non_zero * TX_DATA_NON_ZERO_GAS
        );
        assert_eq!(
            payload_gas(TX_GAS, max_non_zero + 1, 0),
            Err(ChainError::IntrinsicGasOverflow)
        );
        assert_eq!(
            payload_gas(TX_GAS, 0, u64::MAX / TX_DATA_ZERO_GAS + 1),
            Err(ChainError::IntrinsicGasOverflow)
        );
        // Each term fits on its own; the sum does not.
        assert_eq!(
            payload_gas(TX_GAS, max_non_zero, u64::MAX / TX_DATA_ZERO_GAS),
            Err(ChainError::IntrinsicGasOverflow)
        );
    }
}
