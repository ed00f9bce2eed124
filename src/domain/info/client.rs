//! Info sub-client — read-only queries.

use crate::client::{HyperliquidClient, TransportKind};
use crate::domain::info::{InfoRequest, OrderRef};
use crate::domain::staking::{
    Delegation, DelegatorReward, DelegatorSummary, DelegatorUpdate, ValidatorSummary,
};
use crate::error::SdkError;
use crate::shared::Address;
use crate::transport::Endpoint;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub struct Info<'a> {
    pub(crate) client: &'a HyperliquidClient,
}

impl<'a> Info<'a> {
    /// Send any info query and decode its data as `T`.
    pub async fn request<T: DeserializeOwned>(&self, request: &InfoRequest) -> Result<T, SdkError> {
        self.request_via(request, None).await
    }

    /// Like [`request`](Self::request), over an explicit transport.
    pub async fn request_via<T: DeserializeOwned>(
        &self,
        request: &InfoRequest,
        via: Option<TransportKind>,
    ) -> Result<T, SdkError> {
        let payload = serde_json::to_value(request)?;
        let data = self
            .client
            .request(Endpoint::Info, payload, None, via)
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    // ── Market data ──────────────────────────────────────────────────────

    pub async fn meta(&self) -> Result<Value, SdkError> {
        self.request(&InfoRequest::Meta).await
    }

    pub async fn all_mids(&self) -> Result<Value, SdkError> {
        self.request(&InfoRequest::AllMids).await
    }

    pub async fn l2_book(
        &self,
        coin: &str,
        n_sig_figs: Option<u8>,
        mantissa: Option<u8>,
    ) -> Result<Value, SdkError> {
        self.request(&InfoRequest::L2Book {
            coin: coin.to_string(),
            n_sig_figs,
            mantissa,
        })
        .await
    }

    // ── Account ──────────────────────────────────────────────────────────

    pub async fn open_orders(&self, user: Address) -> Result<Value, SdkError> {
        self.request(&InfoRequest::OpenOrders { user }).await
    }

    /// Fills, newest first. `aggregate_by_time` merges partial fills of one crossing.
    pub async fn user_fills(
        &self,
        user: Address,
        aggregate_by_time: Option<bool>,
    ) -> Result<Value, SdkError> {
        self.request(&InfoRequest::UserFills {
            user,
            aggregate_by_time,
        })
        .await
    }

    pub async fn user_fills_by_time(
        &self,
        user: Address,
        start_time: u64,
        end_time: Option<u64>,
        aggregate_by_time: Option<bool>,
    ) -> Result<Value, SdkError> {
        self.request(&InfoRequest::UserFillsByTime {
            user,
            start_time,
            end_time,
            aggregate_by_time,
        })
        .await
    }

    pub async fn order_status(
        &self,
        user: Address,
        oid: impl Into<OrderRef>,
    ) -> Result<Value, SdkError> {
        self.request(&InfoRequest::OrderStatus {
            user,
            oid: oid.into(),
        })
        .await
    }

    /// Vault state; with `user`, also that user's equity in the vault.
    pub async fn vault_details(
        &self,
        vault_address: Address,
        user: Option<Address>,
    ) -> Result<Value, SdkError> {
        self.request(&InfoRequest::VaultDetails {
            vault_address,
            user,
        })
        .await
    }

    // ── Staking ──────────────────────────────────────────────────────────

    pub async fn delegations(&self, user: Address) -> Result<Vec<Delegation>, SdkError> {
        self.request(&InfoRequest::Delegations { user }).await
    }

    pub async fn delegator_summary(&self, user: Address) -> Result<DelegatorSummary, SdkError> {
        self.request(&InfoRequest::DelegatorSummary { user }).await
    }

    pub async fn delegator_history(&self, user: Address) -> Result<Vec<DelegatorUpdate>, SdkError> {
        self.request(&InfoRequest::DelegatorHistory { user }).await
    }

    pub async fn delegator_rewards(&self, user: Address) -> Result<Vec<DelegatorReward>, SdkError> {
        self.request(&InfoRequest::DelegatorRewards { user }).await
    }

    pub async fn validator_summaries(&self) -> Result<Vec<ValidatorSummary>, SdkError> {
        self.request(&InfoRequest::ValidatorSummaries).await
    }
}
