/// Gas schedule and protocol constants
///
/// These values are consensus-critical: every node must charge exactly the same
/// amounts for the same transaction.
///
/// Base cost of any transaction
pub const TX_GAS: u64 = 21_000;

/// Base cost of a creation transaction once homestead is active
pub const TX_GAS_CONTRACT_CREATION: u64 = 53_000;

/// Per zero byte of payload
pub const TX_DATA_ZERO_GAS: u64 = 4;

/// Per non-zero byte of payload
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;

/// Per byte of code stored by a creation
pub const CREATE_DATA_GAS: u64 = 200;

/// Refunds are capped at `gas_used / REFUND_QUOTIENT`
pub const REFUND_QUOTIENT: u64 = 2;

/// Block gas limit used when neither genesis nor environment sets one
pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 4_712_388;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_schedule_ordering() {
        const _: () = assert!(TX_DATA_ZERO_GAS < TX_DATA_NON_ZERO_GAS);
        const _: () = assert!(TX_GAS < TX_GAS_CONTRACT_CREATION);
        const _: () = assert!(TX_GAS_CONTRACT_CREATION < DEFAULT_BLOCK_GAS_LIMIT);
        assert_eq!(REFUND_QUOTIENT, 2);
    }
}
