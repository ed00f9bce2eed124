//! Info endpoint request bodies.

#[cfg(feature = "http")]
pub mod client;

use crate::shared::{Address, Cloid};
use serde::{Deserialize, Serialize};

/// Order lookup key: venue order id or client order id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderRef {
    Oid(u64),
    Cloid(Cloid),
}

impl From<u64> for OrderRef {
    fn from(oid: u64) -> Self {
        OrderRef::Oid(oid)
    }
}

impl From<Cloid> for OrderRef {
    fn from(cloid: Cloid) -> Self {
        OrderRef::Cloid(cloid)
    }
}

/// Body of a POST to `/info`, or the payload of a stream `info` post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InfoRequest {
    Meta,
    AllMids,
    #[serde(rename_all = "camelCase")]
    L2Book {
        coin: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        n_sig_figs: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mantissa: Option<u8>,
    },
    OpenOrders {
        user: Address,
    },
    #[serde(rename_all = "camelCase")]
    UserFills {
        user: Address,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aggregate_by_time: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    UserFillsByTime {
        user: Address,
        start_time: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_time: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aggregate_by_time: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    VaultDetails {
        vault_address: Address,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<Address>,
    },
    Delegations {
        user: Address,
    },
    DelegatorSummary {
        user: Address,
    },
    DelegatorHistory {
        user: Address,
    },
    DelegatorRewards {
        user: Address,
    },
    ValidatorSummaries,
    OrderStatus {
        user: Address,
        oid: OrderRef,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_requests() {
        assert_eq!(
            serde_json::to_value(InfoRequest::AllMids).unwrap(),
            json!({"type": "allMids"})
        );
        assert_eq!(
            serde_json::to_value(InfoRequest::ValidatorSummaries).unwrap(),
            json!({"type": "validatorSummaries"})
        );
    }

    #[test]
    fn test_l2_book_omits_unset_precision() {
        let req = InfoRequest::L2Book {
            coin: "ETH".into(),
            n_sig_figs: None,
            mantissa: None,
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({"type": "l2Book", "coin": "ETH"})
        );

        let req = InfoRequest::L2Book {
            coin: "ETH".into(),
            n_sig_figs: Some(5),
            mantissa: Some(2),
        };
        let value = serde_json::to_value(req).unwrap();
        assert_eq!(value["nSigFigs"], 5);
        assert_eq!(value["mantissa"], 2);
    }

    #[test]
    fn test_order_status_by_oid_and_cloid() {
        let user = Address::zero();
        let by_oid = InfoRequest::OrderStatus {
            user,
            oid: 42.into(),
        };
        assert_eq!(serde_json::to_value(by_oid).unwrap()["oid"], 42);

        let cloid = Cloid::new([0u8; 16]);
        let by_cloid = InfoRequest::OrderStatus {
            user,
            oid: cloid.into(),
        };
        assert_eq!(
            serde_json::to_value(by_cloid).unwrap()["oid"],
            "0x00000000000000000000000000000000"
        );
    }

    #[test]
    fn test_user_fills_by_time_field_names() {
        let req = InfoRequest::UserFillsByTime {
            user: Address::zero(),
            start_time: 1,
            end_time: Some(2),
            aggregate_by_time: Some(true),
        };
        let value = serde_json::to_value(req).unwrap();
        assert_eq!(value["type"], "userFillsByTime");
        assert_eq!(value["startTime"], 1);
        assert_eq!(value["endTime"], 2);
        assert_eq!(value["aggregateByTime"], true);
    }
}
