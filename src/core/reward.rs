//! Fee distribution after execution
//!
//! Fees paid for gas used in a call to a contract are split between the block
//! proposer and the contract's recorded beneficiary; every other fee goes to the
//! proposer alone. Integer arithmetic only, truncating toward zero.

use crate::core::classifier::{recorded_coinbase, AddressRole};
use crate::core::state::WorldState;
use crate::core::types::Address;
use log::debug;
use num_bigint::BigUint;

/// The recorded beneficiary gets `gas_used / BENEFICIARY_SHARE_DIVISOR`
pub const BENEFICIARY_SHARE_DIVISOR: u64 = 10;

/// Gas units credited to each party
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub proposer: u64,
    pub beneficiary: u64,
}

pub fn split_fee(gas_used: u64) -> FeeSplit {
    let beneficiary = gas_used / BENEFICIARY_SHARE_DIVISOR;
    FeeSplit {
        proposer: gas_used - beneficiary,
        beneficiary,
    }
}

/// Credit the fee for `gas_used` at `price`.
///
/// `role` is the recipient role the transition classified; `recipient` is only read
/// when that role is `Contract`.
pub fn distribute<S: WorldState + ?Sized>(
    state: &mut S,
    role: Option<AddressRole>,
    recipient: Option<&Address>,
    coinbase: &Address,
    gas_used: u64,
    price: &BigUint,
) -> FeeSplit {
    match (role, recipient) {
        (Some(AddressRole::Contract), Some(contract)) => {
            let split = split_fee(gas_used);
            let beneficiary = recorded_coinbase(state, contract);
            state.add_balance(coinbase, &(BigUint::from(split.proposer) * price));
            state.add_balance(&beneficiary, &(BigUint::from(split.beneficiary) * price));
            debug!(
                "Fee split for {contract}: {} gas to {coinbase}, {} gas to {beneficiary}",
                split.proposer, split.beneficiary
            );
            split
        }
        _ => {
            state.add_balance(coinbase, &(BigUint::from(gas_used) * price));
            FeeSplit {
                proposer: gas_used,
                beneficiary: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::{mark_role, record_coinbase};
    use crate::core::state::MemoryState;

    fn proposer() -> Address {
        Address([0xc0; 20])
    }

    #[test]
    fn test_split_truncates() {
        assert_eq!(
            split_fee(100),
            FeeSplit {
                proposer: 90,
                beneficiary: 10
            }
        );
        assert_eq!(
            split_fee(109),
            FeeSplit {
                proposer: 99,
                beneficiary: 10
            }
        );
        assert_eq!(
            split_fee(9),
            FeeSplit {
                proposer: 9,
                beneficiary: 0
            }
        );
        assert_eq!(split_fee(0), FeeSplit::default());
    }

    #[test]
    fn test_contract_fee_is_split() {
        let mut state = MemoryState::new();
        let contract = Address([0x01; 20]);
        let author = Address([0xa0; 20]);
        mark_role(&mut state, &contract, AddressRole::Contract);
        record_coinbase(&mut state, &contract, &author);

        let split = distribute(
            &mut state,
            Some(AddressRole::Contract),
            Some(&contract),
            &proposer(),
            100,
            &BigUint::from(5u32),
        );

        assert_eq!(split.beneficiary, 10);
        assert_eq!(state.balance(&author), BigUint::from(50u32));
        assert_eq!(state.balance(&proposer()), BigUint::from(450u32));
    }

    #[test]
    fn test_other_roles_pay_proposer_only() {
        for role in [None, Some(AddressRole::Normal), Some(AddressRole::Template)] {
            let mut state = MemoryState::new();
            let recipient = Address([0x02; 20]);
            record_coinbase(&mut state, &recipient, &Address([0xa0; 20]));

            let split = distribute(
                &mut state,
                role,
                Some(&recipient),
                &proposer(),
                100,
                &BigUint::from(5u32),
            );

            assert_eq!(split.proposer, 100);
            assert_eq!(state.balance(&proposer()), BigUint::from(500u32));
            assert_eq!(state.balance(&Address([0xa0; 20])), BigUint::default());
        }
    }
}
