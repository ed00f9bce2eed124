//! Per-element statuses returned by order, cancel and modify actions.

use crate::shared::Cloid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub oid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloid: Option<Cloid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledOrder {
    pub total_sz: String,
    pub avg_px: String,
    pub oid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloid: Option<Cloid>,
}

/// Outcome of one element of a batch, in submission order.
///
/// A batch can partially fail: some elements rest or fill while others carry
/// an `Error`. Each element is reported on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    Resting(RestingOrder),
    Filled(FilledOrder),
    Error(String),
    Success,
    WaitingForFill,
    WaitingForTrigger,
}

impl OrderStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, OrderStatus::Error(_))
    }

    /// Venue order id, when the element produced one.
    pub fn oid(&self) -> Option<u64> {
        match self {
            OrderStatus::Resting(r) => Some(r.oid),
            OrderStatus::Filled(f) => Some(f.oid),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            OrderStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// `data` payload of order / cancel / modify responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusesData {
    pub statuses: Vec<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_statuses_deserialize_in_order() {
        let json = r#"{"statuses":[
            {"resting":{"oid":123}},
            {"filled":{"totalSz":"0.02","avgPx":"1891.4","oid":77738308}},
            {"error":"Order must have minimum value of $10."},
            "success",
            "waitingForFill"
        ]}"#;
        let data: StatusesData = serde_json::from_str(json).unwrap();

        assert_eq!(data.statuses.len(), 5);
        assert_eq!(data.statuses[0].oid(), Some(123));
        assert_eq!(data.statuses[1].oid(), Some(77738308));
        assert_eq!(
            data.statuses[2].error_message(),
            Some("Order must have minimum value of $10.")
        );
        assert_eq!(data.statuses[3], OrderStatus::Success);
        assert_eq!(data.statuses[4], OrderStatus::WaitingForFill);
    }

    #[test]
    fn test_resting_with_cloid() {
        let json = r#"{"resting":{"oid":5,"cloid":"0x00000000000000000000000000000001"}}"#;
        let status: OrderStatus = serde_json::from_str(json).unwrap();
        match status {
            OrderStatus::Resting(r) => {
                assert_eq!(r.oid, 5);
                assert!(r.cloid.is_some());
            }
            other => panic!("expected resting, got {other:?}"),
        }
    }
}
