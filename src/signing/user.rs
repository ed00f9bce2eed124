//! Typed payloads for user-signed actions (`HyperliquidTransaction:*`).

use super::typed_data::{Eip712Domain, TypedField, TypedPayload, TypedValue};
use crate::domain::action::Action;
use crate::network::SignatureChainId;
use crate::shared::Address;

fn user_domain(chain_id: SignatureChainId) -> Eip712Domain {
    Eip712Domain {
        name: "HyperliquidSignTransaction",
        version: "1",
        chain_id: chain_id.as_u64(),
        verifying_contract: Address::zero(),
    }
}

fn string(name: &'static str, value: &str) -> TypedField {
    TypedField::new(name, TypedValue::String(value.to_string()))
}

fn uint64(name: &'static str, value: u64) -> TypedField {
    TypedField::new(name, TypedValue::Uint64(value))
}

/// Payload for a user-signed action, or `None` for L1 actions.
///
/// Destinations are signed as lowercase hex strings; the agent address is
/// signed as an `address`.
pub fn user_signed_payload(action: &Action) -> Option<TypedPayload> {
    let chain = action.chain_binding()?;
    let hl_chain = string("hyperliquidChain", &chain.hyperliquid_chain);

    let (primary_type, fields) = match action {
        Action::UsdSend(a) => (
            "HyperliquidTransaction:UsdSend",
            vec![
                hl_chain,
                string("destination", &format!("{:#x}", a.destination)),
                string("amount", &a.amount),
                uint64("time", a.time),
            ],
        ),
        Action::SpotSend(a) => (
            "HyperliquidTransaction:SpotSend",
            vec![
                hl_chain,
                string("destination", &format!("{:#x}", a.destination)),
                string("token", &a.token),
                string("amount", &a.amount),
                uint64("time", a.time),
            ],
        ),
        Action::Withdraw3(a) => (
            "HyperliquidTransaction:Withdraw",
            vec![
                hl_chain,
                string("destination", &format!("{:#x}", a.destination)),
                string("amount", &a.amount),
                uint64("time", a.time),
            ],
        ),
        Action::UsdClassTransfer(a) => (
            "HyperliquidTransaction:UsdClassTransfer",
            vec![
                hl_chain,
                string("amount", &a.amount),
                TypedField::new("toPerp", TypedValue::Bool(a.to_perp)),
                uint64("nonce", a.nonce),
            ],
        ),
        Action::ApproveAgent(a) => (
            "HyperliquidTransaction:ApproveAgent",
            vec![
                hl_chain,
                TypedField::new("agentAddress", TypedValue::Address(a.agent_address)),
                string("agentName", a.agent_name.as_deref().unwrap_or("")),
                uint64("nonce", a.nonce),
            ],
        ),
        _ => return None,
    };

    Some(TypedPayload {
        domain: user_domain(chain.signature_chain_id),
        primary_type,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transfer::{ApproveAgent, UsdClassTransfer, UsdSend, Withdraw3};
    use crate::domain::vault::CreateVault;
    use crate::network::Network;

    #[test]
    fn test_usd_send_type_string() {
        let mut action = Action::UsdSend(UsdSend::new(Address::repeat_byte(0x11), "2"));
        action.bind(99, Network::Mainnet, SignatureChainId(0xa4b1));
        let payload = user_signed_payload(&action).unwrap();
        assert_eq!(
            payload.encode_type(),
            "HyperliquidTransaction:UsdSend(string hyperliquidChain,string destination,string amount,uint64 time)"
        );
        assert_eq!(payload.domain.chain_id, 0xa4b1);
        assert_eq!(payload.domain.name, "HyperliquidSignTransaction");
        assert_eq!(payload.fields[3].value, TypedValue::Uint64(99));
    }

    #[test]
    fn test_withdraw_uses_withdraw_type_name() {
        let action = Action::Withdraw3(Withdraw3::new(Address::zero(), "1"));
        let payload = user_signed_payload(&action).unwrap();
        assert!(payload.encode_type().starts_with("HyperliquidTransaction:Withdraw("));
    }

    #[test]
    fn test_usd_class_transfer_and_approve_agent_types() {
        let transfer = Action::UsdClassTransfer(UsdClassTransfer::new("5", true));
        assert_eq!(
            user_signed_payload(&transfer).unwrap().encode_type(),
            "HyperliquidTransaction:UsdClassTransfer(string hyperliquidChain,string amount,bool toPerp,uint64 nonce)"
        );

        let approve = Action::ApproveAgent(ApproveAgent::new(Address::zero(), None));
        let payload = user_signed_payload(&approve).unwrap();
        assert_eq!(
            payload.encode_type(),
            "HyperliquidTransaction:ApproveAgent(string hyperliquidChain,address agentAddress,string agentName,uint64 nonce)"
        );
        assert_eq!(payload.fields[2].value, TypedValue::String(String::new()));
    }

    #[test]
    fn test_chain_id_changes_digest() {
        let mut a = Action::UsdSend(UsdSend::new(Address::zero(), "1"));
        let mut b = a.clone();
        a.bind(1, Network::Mainnet, SignatureChainId(1));
        b.bind(1, Network::Mainnet, SignatureChainId(0xa4b1));
        assert_ne!(
            user_signed_payload(&a).unwrap().digest(),
            user_signed_payload(&b).unwrap().digest()
        );
    }

    #[test]
    fn test_l1_action_has_no_user_payload() {
        let action = Action::CreateVault(CreateVault::new("v", "d", 1));
        assert!(user_signed_payload(&action).is_none());
    }
}
