//! Staking domain — delegations, rewards and validator summaries.

use crate::shared::serde_util::{option_timestamp_ms, timestamp_ms};
use crate::shared::Address;
use chrono::{DateTime, Utc};
use ethers::types::H256;
use serde::{Deserialize, Serialize};

/// A user's delegation to a validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    pub validator: Address,
    pub amount: String,
    #[serde(with = "timestamp_ms")]
    pub locked_until_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardSource {
    Delegation,
    Commission,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatorReward {
    #[serde(with = "timestamp_ms")]
    pub time: DateTime<Utc>,
    pub source: RewardSource,
    pub total_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatorSummary {
    pub delegated: String,
    pub undelegated: String,
    pub total_pending_withdrawal: String,
    pub n_pending_withdrawals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateDelta {
    pub validator: Address,
    pub amount: String,
    pub is_undelegate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositDelta {
    pub amount: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalPhase {
    Initiated,
    Finalized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalDelta {
    pub amount: String,
    pub phase: WithdrawalPhase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DelegatorDelta {
    #[serde(rename = "delegate")]
    Delegate(DelegateDelta),
    #[serde(rename = "cDeposit")]
    Deposit(DepositDelta),
    #[serde(rename = "withdrawal")]
    Withdrawal(WithdrawalDelta),
}

/// One staking event in a delegator's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegatorUpdate {
    #[serde(with = "timestamp_ms")]
    pub time: DateTime<Utc>,
    pub hash: H256,
    pub delta: DelegatorDelta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorStats {
    pub uptime_fraction: String,
    pub predicted_apr: String,
    pub n_samples: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorSummary {
    pub validator: Address,
    pub signer: Address,
    pub name: String,
    pub description: String,
    pub n_recent_blocks: u64,
    pub stake: u64,
    pub is_jailed: bool,
    #[serde(with = "option_timestamp_ms")]
    pub unjailable_after: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub commission: String,
    /// `[("day", …), ("week", …), ("month", …)]`.
    pub stats: Vec<(String, ValidatorStats)>,
}

impl ValidatorSummary {
    pub fn stats_for(&self, period: &str) -> Option<&ValidatorStats> {
        self.stats.iter().find(|(p, _)| p == period).map(|(_, s)| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegator_update_variants() {
        let json = r#"[
            {"time":1700000000000,"hash":"0x0000000000000000000000000000000000000000000000000000000000000001",
             "delta":{"delegate":{"validator":"0x5ac99df645f3414876c816caa18b2d234024b487","amount":"10.0","isUndelegate":false}}},
            {"time":1700000000001,"hash":"0x0000000000000000000000000000000000000000000000000000000000000002",
             "delta":{"cDeposit":{"amount":"5.0"}}},
            {"time":1700000000002,"hash":"0x0000000000000000000000000000000000000000000000000000000000000003",
             "delta":{"withdrawal":{"amount":"1.0","phase":"initiated"}}}
        ]"#;
        let updates: Vec<DelegatorUpdate> = serde_json::from_str(json).unwrap();
        assert!(matches!(updates[0].delta, DelegatorDelta::Delegate(_)));
        assert!(matches!(updates[1].delta, DelegatorDelta::Deposit(_)));
        match &updates[2].delta {
            DelegatorDelta::Withdrawal(w) => assert_eq!(w.phase, WithdrawalPhase::Initiated),
            other => panic!("unexpected delta {other:?}"),
        }
        assert_eq!(updates[0].time.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_validator_summary_stats_tuples() {
        let json = r#"{
            "validator":"0x5ac99df645f3414876c816caa18b2d234024b487",
            "signer":"0x6ac99df645f3414876c816caa18b2d234024b487",
            "name":"v","description":"d","nRecentBlocks":10,"stake":1000,
            "isJailed":false,"unjailableAfter":null,"isActive":true,"commission":"0.05",
            "stats":[
                ["day",{"uptimeFraction":"1.0","predictedApr":"0.02","nSamples":100}],
                ["week",{"uptimeFraction":"0.99","predictedApr":"0.02","nSamples":700}],
                ["month",{"uptimeFraction":"0.98","predictedApr":"0.02","nSamples":3000}]
            ]
        }"#;
        let summary: ValidatorSummary = serde_json::from_str(json).unwrap();
        assert!(summary.unjailable_after.is_none());
        assert_eq!(summary.stats_for("week").unwrap().n_samples, 700);
        assert!(summary.stats_for("year").is_none());
    }
}
