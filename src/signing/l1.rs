//! L1 action hashing through the phantom agent.
//!
//! The action is msgpack-encoded with named fields, followed by the nonce, the
//! vault marker and the optional expiry. The keccak of that buffer becomes the
//! `connectionId` of an `Agent` struct signed under the fixed L1 domain.

use super::typed_data::{Eip712Domain, TypedField, TypedPayload, TypedValue};
use crate::domain::action::Action;
use crate::error::SdkError;
use crate::network::{Network, L1_SIGNING_CHAIN_ID};
use crate::shared::Address;
use ethers::types::H256;
use ethers::utils::keccak256;

pub(crate) fn l1_domain() -> Eip712Domain {
    Eip712Domain {
        name: "Exchange",
        version: "1",
        chain_id: L1_SIGNING_CHAIN_ID,
        verifying_contract: Address::zero(),
    }
}

/// `connectionId` for an L1 action.
pub fn action_hash(
    action: &Action,
    nonce: u64,
    vault_address: Option<Address>,
    expires_after: Option<u64>,
) -> Result<H256, SdkError> {
    let mut data = rmp_serde::to_vec_named(action)?;
    data.extend_from_slice(&nonce.to_be_bytes());
    match vault_address {
        None => data.push(0x00),
        Some(vault) => {
            data.push(0x01);
            data.extend_from_slice(vault.as_bytes());
        }
    }
    if let Some(expires_after) = expires_after {
        data.push(0x00);
        data.extend_from_slice(&expires_after.to_be_bytes());
    }
    Ok(H256::from(keccak256(&data)))
}

/// `Agent(string source,bytes32 connectionId)` under the L1 domain.
pub fn agent_payload(connection_id: H256, network: Network) -> TypedPayload {
    TypedPayload {
        domain: l1_domain(),
        primary_type: "Agent",
        fields: vec![
            TypedField::new("source", TypedValue::String(network.agent_source().into())),
            TypedField::new("connectionId", TypedValue::Bytes32(connection_id)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{BulkCancel, BulkOrder, CancelRequest, Grouping, OrderRequest, Tif};

    fn order_action(orders: Vec<OrderRequest>) -> Action {
        Action::Order(BulkOrder {
            orders,
            grouping: Grouping::Na,
            builder: None,
        })
    }

    #[test]
    fn test_action_hash_is_deterministic() {
        let action = order_action(vec![OrderRequest::limit(0, true, "1800", "0.1", Tif::Gtc)]);
        let a = action_hash(&action, 17, None, None).unwrap();
        let b = action_hash(&action, 17, None, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_action_hash_binds_nonce_vault_and_expiry() {
        let action = Action::Cancel(BulkCancel {
            cancels: vec![CancelRequest { asset: 0, oid: 1 }],
        });
        let base = action_hash(&action, 1, None, None).unwrap();
        assert_ne!(base, action_hash(&action, 2, None, None).unwrap());
        assert_ne!(
            base,
            action_hash(&action, 1, Some(Address::repeat_byte(1)), None).unwrap()
        );
        assert_ne!(base, action_hash(&action, 1, None, Some(5)).unwrap());
    }

    #[test]
    fn test_batch_order_is_significant() {
        let first = OrderRequest::limit(0, true, "1800", "0.1", Tif::Gtc);
        let second = OrderRequest::limit(1, false, "30000", "0.01", Tif::Ioc);
        let forward = order_action(vec![first.clone(), second.clone()]);
        let reversed = order_action(vec![second, first]);
        assert_ne!(
            action_hash(&forward, 1, None, None).unwrap(),
            action_hash(&reversed, 1, None, None).unwrap()
        );
    }

    #[test]
    fn test_agent_source_per_network() {
        let mainnet = agent_payload(H256::zero(), Network::Mainnet);
        let testnet = agent_payload(H256::zero(), Network::Testnet);
        assert_eq!(mainnet.fields[0].value, TypedValue::String("a".into()));
        assert_eq!(testnet.fields[0].value, TypedValue::String("b".into()));
        assert_eq!(mainnet.domain.chain_id, 1337);
        assert_ne!(mainnet.digest(), testnet.digest());
    }
}
