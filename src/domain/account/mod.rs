//! Account settings — leverage, isolated margin, spot dusting, referrer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeverage {
    pub asset: u32,
    pub is_cross: bool,
    pub leverage: u32,
}

/// Add (`ntli > 0`) or remove margin from an isolated position. `ntli` is micro-USD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIsolatedMargin {
    pub asset: u32,
    pub is_buy: bool,
    pub ntli: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSpotDusting {
    pub opt_out: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotUser {
    pub toggle_spot_dusting: ToggleSpotDusting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetReferrer {
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_leverage_keys() {
        let action = UpdateLeverage {
            asset: 1,
            is_cross: true,
            leverage: 5,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["isCross"], true);
        assert_eq!(json["leverage"], 5);
    }

    #[test]
    fn test_spot_user_keys() {
        let action = SpotUser {
            toggle_spot_dusting: ToggleSpotDusting { opt_out: true },
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["toggleSpotDusting"]["optOut"], true);
    }
}
