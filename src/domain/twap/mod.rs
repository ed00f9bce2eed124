//! TWAP domain — time-weighted order start / cancel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapRequest {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "b")]
    pub is_buy: bool,
    #[serde(rename = "s")]
    pub sz: String,
    #[serde(rename = "r")]
    pub reduce_only: bool,
    /// Duration in minutes.
    #[serde(rename = "m")]
    pub minutes: u32,
    #[serde(rename = "t")]
    pub randomize: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapOrder {
    pub twap: TwapRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapCancel {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "t")]
    pub twap_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTwap {
    pub twap_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TwapStatus {
    Running(RunningTwap),
    Error(String),
}

/// `data` payload of a `twapOrder` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapStatusData {
    pub status: TwapStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twap_order_wire_keys() {
        let order = TwapOrder {
            twap: TwapRequest {
                asset: 4,
                is_buy: true,
                sz: "1.5".into(),
                reduce_only: false,
                minutes: 5,
                randomize: false,
            },
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["twap"]["a"], 4);
        assert_eq!(json["twap"]["m"], 5);
        assert_eq!(json["twap"]["t"], false);
    }

    #[test]
    fn test_twap_status_running() {
        let data: TwapStatusData =
            serde_json::from_str(r#"{"status":{"running":{"twapId":77}}}"#).unwrap();
        assert_eq!(data.status, TwapStatus::Running(RunningTwap { twap_id: 77 }));
    }
}
