//! Role/kind dispatch
//!
//! A transaction is only valid when its declared kind matches what the recipient is
//! on-chain at execution time. [`decide`] is the whole decision table as a pure
//! function; [`execute`] carries out the chosen [`Action`] against a backend.
//!
//! | recipient | role     | kind                       | action                  |
//! |-----------|----------|----------------------------|-------------------------|
//! | absent    |          | any                        | deploy template         |
//! | present   | template | binary                     | instantiate template    |
//! | present   | template | source_code                | install source          |
//! | present   | template | endorse                    | endorse                 |
//! | present   | contract | endorse                    | endorse                 |
//! | present   | contract | binary                     | call, no validators     |
//! | present   | normal   | endorse                    | endorse                 |
//! | present   | normal   | binary                     | call with validators    |
//! | present   | normal   | governance (empty payload) | call with validators    |
//!
//! Every other pair is rejected with `InvalidType`.

use crate::core::classifier::{recorded_coinbase, AddressRole};
use crate::core::state::WorldState;
use crate::core::types::{Address, Hash, TxKind};
use crate::core::vm::{CallResult, CreateMode, ExecutionBackend};
use crate::error::{ChainError, Result};
use log::debug;
use num_bigint::BigUint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DeployTemplate,
    InstantiateTemplate,
    InstallSource,
    Endorse,
    Call { validators: bool },
}

impl Action {
    /// Creation actions leave the sender nonce to the backend.
    pub fn bumps_nonce(&self) -> bool {
        !matches!(self, Action::DeployTemplate | Action::InstantiateTemplate)
    }
}

/// Pick the action for a recipient role (`None` for creation) and transaction kind.
pub fn decide(target: Option<AddressRole>, kind: TxKind, payload: &[u8]) -> Result<Action> {
    let role = match target {
        None => return Ok(Action::DeployTemplate),
        Some(role) => role,
    };

    match (role, kind) {
        (AddressRole::Template, TxKind::Binary) => Ok(Action::InstantiateTemplate),
        (AddressRole::Template, TxKind::SourceCode) => Ok(Action::InstallSource),
        (AddressRole::Template, TxKind::Endorse) => Ok(Action::Endorse),
        (AddressRole::Contract, TxKind::Endorse) => Ok(Action::Endorse),
        (AddressRole::Contract, TxKind::Binary) => Ok(Action::Call { validators: false }),
        (AddressRole::Normal, TxKind::Endorse) => Ok(Action::Endorse),
        (AddressRole::Normal, TxKind::Binary) => Ok(Action::Call { validators: true }),
        (AddressRole::Normal, kind) if kind.is_governance() => {
            if !payload.is_empty() {
                return Err(ChainError::InvalidInput { kind });
            }
            Ok(Action::Call { validators: true })
        }
        (role, kind) => Err(ChainError::InvalidType {
            role: Some(role),
            kind,
        }),
    }
}

/// Init code for instantiating `template`: its code, the payload, the recorded coinbase
/// and the template's own address.
pub fn template_init_code<S: WorldState + ?Sized>(
    state: &S,
    template: &Address,
    payload: &[u8],
) -> Vec<u8> {
    let mut code = state.code(template);
    code.extend_from_slice(payload);
    code.extend_from_slice(recorded_coinbase(state, template).as_bytes());
    code.extend_from_slice(template.as_bytes());
    code
}

/// Everything a dispatched action needs besides state and backend
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub sender: Address,
    pub recipient: Option<Address>,
    pub kind: TxKind,
    pub payload: &'a [u8],
    pub value: &'a BigUint,
    pub gas: u64,
    pub validators: &'a [Address],
    pub tx_hash: Hash,
}

/// Run `action`, bumping the sender nonce first when the action calls for it.
pub fn execute<B: ExecutionBackend + ?Sized>(
    action: Action,
    state: &mut dyn WorldState,
    backend: &mut B,
    invocation: &Invocation<'_>,
) -> Result<CallResult> {
    let sender = invocation.sender;
    let recipient = match (action, invocation.recipient) {
        (Action::DeployTemplate, _) => None,
        (_, Some(recipient)) => Some(recipient),
        (_, None) => {
            return Err(ChainError::InvalidType {
                role: None,
                kind: invocation.kind,
            })
        }
    };

    if action.bumps_nonce() {
        let nonce = state.nonce(&sender);
        state.set_nonce(&sender, nonce.wrapping_add(1));
    }
    debug!("Dispatching {action:?} from {sender}");

    let result = match (action, recipient) {
        (Action::InstantiateTemplate, Some(template)) => {
            let init_code = template_init_code(&*state, &template, invocation.payload);
            backend.create(
                state,
                sender,
                &init_code,
                invocation.gas,
                invocation.value,
                CreateMode::Contract,
            )
        }
        (Action::InstallSource, Some(to)) => backend.source_install(
            state,
            sender,
            to,
            invocation.payload,
            invocation.gas,
            invocation.value,
            invocation.tx_hash,
        ),
        (Action::Endorse, Some(to)) => backend.endorse(
            state,
            sender,
            to,
            invocation.payload,
            invocation.gas,
            invocation.value,
            invocation.tx_hash,
        ),
        (Action::Call { validators }, Some(to)) => backend.call(
            state,
            sender,
            to,
            invocation.payload,
            invocation.gas,
            invocation.value,
            validators.then_some(invocation.validators),
        ),
        _ => backend.create(
            state,
            sender,
            invocation.payload,
            invocation.gas,
            invocation.value,
            CreateMode::Template,
        ),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::{mark_role, record_coinbase};
    use crate::core::state::MemoryState;

    const ROLES: [AddressRole; 3] = [
        AddressRole::Normal,
        AddressRole::Contract,
        AddressRole::Template,
    ];

    fn allowed(role: AddressRole, kind: TxKind) -> Option<Action> {
        match (role, kind) {
            (AddressRole::Template, TxKind::Binary) => Some(Action::InstantiateTemplate),
            (AddressRole::Template, TxKind::SourceCode) => Some(Action::InstallSource),
            (_, TxKind::Endorse) => Some(Action::Endorse),
            (AddressRole::Contract, TxKind::Binary) => Some(Action::Call { validators: false }),
            (AddressRole::Normal, TxKind::Binary) => Some(Action::Call { validators: true }),
            (AddressRole::Normal, kind) if kind.is_governance() => {
                Some(Action::Call { validators: true })
            }
            _ => None,
        }
    }

    #[test]
    fn test_creation_ignores_kind() {
        for kind in TxKind::ALL {
            assert_eq!(decide(None, kind, b"code").unwrap(), Action::DeployTemplate);
        }
    }

    #[test]
    fn test_matrix_is_complete() {
        for role in ROLES {
            for kind in TxKind::ALL {
                match (decide(Some(role), kind, &[]), allowed(role, kind)) {
                    (Ok(action), Some(expected)) => assert_eq!(action, expected),
                    (Err(err), None) => assert_eq!(
                        err,
                        ChainError::InvalidType {
                            role: Some(role),
                            kind
                        }
                    ),
                    (got, expected) => {
                        panic!("{role}/{kind}: got {got:?}, expected {expected:?}")
                    }
                }
            }
        }
    }

    #[test]
    fn test_governance_rejects_payload() {
        for kind in TxKind::ALL.into_iter().filter(|k| k.is_governance()) {
            assert_eq!(
                decide(Some(AddressRole::Normal), kind, &[0]),
                Err(ChainError::InvalidInput { kind })
            );
        }
        // Payload on a governance kind sent to a contract is a type error first.
        assert!(matches!(
            decide(Some(AddressRole::Contract), TxKind::Delegate, &[1]),
            Err(ChainError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_nonce_bump_rules() {
        assert!(!Action::DeployTemplate.bumps_nonce());
        assert!(!Action::InstantiateTemplate.bumps_nonce());
        assert!(Action::InstallSource.bumps_nonce());
        assert!(Action::Endorse.bumps_nonce());
        assert!(Action::Call { validators: true }.bumps_nonce());
    }

    #[test]
    fn test_template_init_code_layout() {
        let mut state = MemoryState::new();
        let template = Address([0x77; 20]);
        let author = Address([0x11; 20]);
        state.set_code(&template, vec![0xde, 0xad]);
        mark_role(&mut state, &template, AddressRole::Template);
        record_coinbase(&mut state, &template, &author);

        let code = template_init_code(&state, &template, &[0xbe, 0xef]);
        assert_eq!(code.len(), 4 + 40);
        assert_eq!(&code[..4], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&code[4..24], author.as_bytes());
        assert_eq!(&code[24..], template.as_bytes());

        let without_payload = template_init_code(&state, &template, &[]);
        assert_eq!(&without_payload[..2], &[0xde, 0xad]);
        assert_eq!(without_payload.len(), 2 + 40);
    }
}
