//! The tagged action payload submitted to the exchange endpoint.

use crate::domain::account::{SetReferrer, SpotUser, UpdateIsolatedMargin, UpdateLeverage};
use crate::domain::order::{BulkCancel, BulkCancelByCloid, BulkModify, BulkOrder, ModifyRequest, ScheduleCancel};
use crate::domain::transfer::{
    ApproveAgent, ChainBinding, SpotSend, UsdClassTransfer, UsdSend, Withdraw3,
};
use crate::domain::twap::{TwapCancel, TwapOrder};
use crate::domain::vault::{CreateVault, VaultTransfer};
use crate::network::{Network, SignatureChainId};
use serde::{Deserialize, Serialize};

/// An exchange action.
///
/// The `type` tag is written first, followed by the variant's fields in
/// declaration order. For L1 actions that byte layout is what gets hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Order(BulkOrder),
    Cancel(BulkCancel),
    CancelByCloid(BulkCancelByCloid),
    Modify(ModifyRequest),
    BatchModify(BulkModify),
    ScheduleCancel(ScheduleCancel),
    UpdateLeverage(UpdateLeverage),
    UpdateIsolatedMargin(UpdateIsolatedMargin),
    TwapOrder(TwapOrder),
    TwapCancel(TwapCancel),
    CreateVault(CreateVault),
    VaultTransfer(VaultTransfer),
    SpotUser(SpotUser),
    SetReferrer(SetReferrer),
    UsdSend(UsdSend),
    SpotSend(SpotSend),
    Withdraw3(Withdraw3),
    UsdClassTransfer(UsdClassTransfer),
    ApproveAgent(ApproveAgent),
}

impl Action {
    /// Wire tag, as written in the `type` field.
    pub fn tag(&self) -> &'static str {
        match self {
            Action::Order(_) => "order",
            Action::Cancel(_) => "cancel",
            Action::CancelByCloid(_) => "cancelByCloid",
            Action::Modify(_) => "modify",
            Action::BatchModify(_) => "batchModify",
            Action::ScheduleCancel(_) => "scheduleCancel",
            Action::UpdateLeverage(_) => "updateLeverage",
            Action::UpdateIsolatedMargin(_) => "updateIsolatedMargin",
            Action::TwapOrder(_) => "twapOrder",
            Action::TwapCancel(_) => "twapCancel",
            Action::CreateVault(_) => "createVault",
            Action::VaultTransfer(_) => "vaultTransfer",
            Action::SpotUser(_) => "spotUser",
            Action::SetReferrer(_) => "setReferrer",
            Action::UsdSend(_) => "usdSend",
            Action::SpotSend(_) => "spotSend",
            Action::Withdraw3(_) => "withdraw3",
            Action::UsdClassTransfer(_) => "usdClassTransfer",
            Action::ApproveAgent(_) => "approveAgent",
        }
    }

    /// Whether the action is signed directly by the user (EIP-712 struct under the
    /// wallet's chain id) rather than through the L1 phantom agent.
    pub fn is_user_signed(&self) -> bool {
        matches!(
            self,
            Action::UsdSend(_)
                | Action::SpotSend(_)
                | Action::Withdraw3(_)
                | Action::UsdClassTransfer(_)
                | Action::ApproveAgent(_)
        )
    }

    /// Chain binding of a user-signed action.
    pub fn chain_binding(&self) -> Option<&ChainBinding> {
        match self {
            Action::UsdSend(a) => Some(&a.chain),
            Action::SpotSend(a) => Some(&a.chain),
            Action::Withdraw3(a) => Some(&a.chain),
            Action::UsdClassTransfer(a) => Some(&a.chain),
            Action::ApproveAgent(a) => Some(&a.chain),
            _ => None,
        }
    }

    /// Number of elements whose statuses the response reports individually.
    pub fn batch_len(&self) -> Option<usize> {
        match self {
            Action::Order(o) => Some(o.orders.len()),
            Action::Cancel(c) => Some(c.cancels.len()),
            Action::CancelByCloid(c) => Some(c.cancels.len()),
            Action::BatchModify(m) => Some(m.modifies.len()),
            _ => None,
        }
    }

    /// Write the request nonce and chain binding into the fields that embed them.
    ///
    /// Must run before signing. Actions without such fields are left untouched.
    pub fn bind(&mut self, nonce: u64, network: Network, chain_id: SignatureChainId) {
        let chain = ChainBinding::new(network, chain_id);
        match self {
            Action::CreateVault(a) => a.nonce = nonce,
            Action::UsdSend(a) => {
                a.chain = chain;
                a.time = nonce;
            }
            Action::SpotSend(a) => {
                a.chain = chain;
                a.time = nonce;
            }
            Action::Withdraw3(a) => {
                a.chain = chain;
                a.time = nonce;
            }
            Action::UsdClassTransfer(a) => {
                a.chain = chain;
                a.nonce = nonce;
            }
            Action::ApproveAgent(a) => {
                a.chain = chain;
                a.nonce = nonce;
            }
            _ => {}
        }
    }
}

impl From<BulkOrder> for Action {
    fn from(v: BulkOrder) -> Self {
        Action::Order(v)
    }
}

impl From<BulkCancel> for Action {
    fn from(v: BulkCancel) -> Self {
        Action::Cancel(v)
    }
}

impl From<CreateVault> for Action {
    fn from(v: CreateVault) -> Self {
        Action::CreateVault(v)
    }
}

impl From<UpdateLeverage> for Action {
    fn from(v: UpdateLeverage) -> Self {
        Action::UpdateLeverage(v)
    }
}

impl From<TwapOrder> for Action {
    fn from(v: TwapOrder) -> Self {
        Action::TwapOrder(v)
    }
}

impl From<TwapCancel> for Action {
    fn from(v: TwapCancel) -> Self {
        Action::TwapCancel(v)
    }
}

impl From<SpotUser> for Action {
    fn from(v: SpotUser) -> Self {
        Action::SpotUser(v)
    }
}

impl From<UsdSend> for Action {
    fn from(v: UsdSend) -> Self {
        Action::UsdSend(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{CancelRequest, Grouping, OrderRequest, Tif};
    use crate::shared::Address;

    #[test]
    fn test_type_tag_written_first() {
        let action = Action::Cancel(BulkCancel {
            cancels: vec![CancelRequest { asset: 1, oid: 2 }],
        });
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.starts_with(r#"{"type":"cancel""#), "got {json}");
    }

    #[test]
    fn test_tag_matches_serialized_type() {
        let actions = vec![
            Action::Order(BulkOrder {
                orders: vec![OrderRequest::limit(0, true, "1", "1", Tif::Gtc)],
                grouping: Grouping::Na,
                builder: None,
            }),
            Action::CreateVault(CreateVault::new("v", "d", 1)),
            Action::Withdraw3(Withdraw3::new(Address::zero(), "1")),
            Action::ScheduleCancel(ScheduleCancel::default()),
        ];
        for action in actions {
            let json = serde_json::to_value(&action).unwrap();
            assert_eq!(json["type"], action.tag());
        }
    }

    #[test]
    fn test_bind_sets_embedded_nonce_and_chain() {
        let mut vault = Action::CreateVault(CreateVault::new("v", "d", 50_000_000));
        vault.bind(17, Network::Testnet, SignatureChainId(0x66eee));
        match &vault {
            Action::CreateVault(v) => assert_eq!(v.nonce, 17),
            _ => unreachable!(),
        }

        let mut send = Action::UsdSend(UsdSend::new(Address::zero(), "1"));
        send.bind(42, Network::Testnet, SignatureChainId(1));
        match &send {
            Action::UsdSend(s) => {
                assert_eq!(s.time, 42);
                assert_eq!(s.chain.signature_chain_id, SignatureChainId(1));
                assert_eq!(s.chain.hyperliquid_chain, "Testnet");
            }
            _ => unreachable!(),
        }
        assert!(send.is_user_signed());
        assert!(!vault.is_user_signed());
    }
}
