//! Exchange sub-client — sign and submit actions.
//!
//! Every call follows the same pipeline: allocate the session's next nonce,
//! resolve the signature chain id (user-signed actions only), bind both into
//! the action, sign, transmit, then interpret the `{status, response}` envelope.

use crate::client::{HyperliquidClient, TransportKind};
use crate::domain::account::{SetReferrer, SpotUser, ToggleSpotDusting, UpdateIsolatedMargin, UpdateLeverage};
use crate::domain::action::Action;
use crate::domain::exchange::{ExchangeEnvelope, ExchangeRequest, ExchangeResponse};
use crate::domain::order::{
    BulkCancel, BulkCancelByCloid, BulkModify, BulkOrder, CancelByCloidRequest, CancelRequest,
    Grouping, ModifyRequest, OrderRequest, OrderStatus, ScheduleCancel,
};
use crate::domain::transfer::{ApproveAgent, SpotSend, UsdClassTransfer, UsdSend, Withdraw3};
use crate::domain::twap::{TwapCancel, TwapOrder, TwapRequest, TwapStatus};
use crate::domain::vault::{CreateVault, VaultTransfer};
use crate::error::SdkError;
use crate::shared::Address;
use crate::signing::SignContext;
use crate::transport::Endpoint;
use crate::wallet::WalletSession;

use std::time::Duration;

/// Per-call submission settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Act on behalf of this vault or subaccount.
    pub vault_address: Option<Address>,
    /// Venue-side expiry, in ms since epoch. Part of the signed hash.
    pub expires_after: Option<u64>,
    /// Overrides the transport's deadline.
    pub timeout: Option<Duration>,
    /// Overrides the client's default transport.
    pub transport: Option<TransportKind>,
}

impl SubmitOptions {
    pub fn vault(vault_address: Address) -> Self {
        Self {
            vault_address: Some(vault_address),
            ..Self::default()
        }
    }

    pub fn with_expires_after(mut self, expires_after: u64) -> Self {
        self.expires_after = Some(expires_after);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn via(mut self, transport: TransportKind) -> Self {
        self.transport = Some(transport);
        self
    }
}

pub struct Exchange<'a> {
    pub(crate) client: &'a HyperliquidClient,
}

impl<'a> Exchange<'a> {
    /// Sign `action` into a request body without sending it.
    ///
    /// Consumes one nonce from the session.
    pub async fn sign(
        &self,
        session: &WalletSession,
        action: impl Into<Action>,
        options: &SubmitOptions,
    ) -> Result<ExchangeRequest, SdkError> {
        let network = self.client.network();
        if session.network() != network {
            return Err(SdkError::Validation(format!(
                "wallet session targets {}, client targets {}",
                session.network(),
                network
            )));
        }

        let mut action = action.into();
        let nonce = session.next_nonce();
        let chain_id = if action.is_user_signed() {
            session.chain_id().await?
        } else {
            network.default_signature_chain_id()
        };
        action.bind(nonce, network, chain_id);

        let ctx = SignContext {
            nonce,
            chain_id,
            vault_address: options.vault_address,
            expires_after: options.expires_after,
        };
        let signature = self
            .client
            .signer()
            .sign(&action, &ctx, session.wallet())
            .await?;

        Ok(ExchangeRequest {
            action,
            nonce,
            signature,
            vault_address: options.vault_address,
            expires_after: options.expires_after,
        })
    }

    /// Sign and send `action`.
    ///
    /// A `status: "err"` envelope surfaces as [`SdkError::Api`] carrying the
    /// venue's message verbatim. It is never retried.
    pub async fn submit(
        &self,
        session: &WalletSession,
        action: impl Into<Action>,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let request = self.sign(session, action, options).await?;
        self.send(&request, options).await
    }

    /// Send an already signed request.
    pub async fn send(
        &self,
        request: &ExchangeRequest,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let payload = serde_json::to_value(request)?;
        let reply = self
            .client
            .request(Endpoint::Exchange, payload, options.timeout, options.transport)
            .await?;
        let envelope: ExchangeEnvelope = serde_json::from_value(reply)?;

        match envelope.into_result() {
            Ok(response) => {
                tracing::debug!(
                    action = request.action.tag(),
                    nonce = request.nonce,
                    response = %response.kind,
                    "action accepted"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(
                    action = request.action.tag(),
                    nonce = request.nonce,
                    error = %e,
                    "action rejected"
                );
                Err(e.into())
            }
        }
    }

    async fn submit_batch(
        &self,
        session: &WalletSession,
        action: Action,
        options: &SubmitOptions,
    ) -> Result<Vec<OrderStatus>, SdkError> {
        let expected = action.batch_len();
        let statuses = self.submit(session, action, options).await?.statuses()?;
        if let Some(expected) = expected {
            if statuses.len() != expected {
                tracing::warn!(
                    expected,
                    received = statuses.len(),
                    "status count does not match batch size"
                );
            }
        }
        Ok(statuses)
    }

    // ── Orders ───────────────────────────────────────────────────────────

    /// Place orders. One status per order, in submission order; some may fail
    /// while others rest or fill.
    pub async fn order(
        &self,
        session: &WalletSession,
        orders: Vec<OrderRequest>,
        grouping: Grouping,
        options: &SubmitOptions,
    ) -> Result<Vec<OrderStatus>, SdkError> {
        let action = Action::Order(BulkOrder {
            orders,
            grouping,
            builder: None,
        });
        self.submit_batch(session, action, options).await
    }

    pub async fn cancel(
        &self,
        session: &WalletSession,
        cancels: Vec<CancelRequest>,
        options: &SubmitOptions,
    ) -> Result<Vec<OrderStatus>, SdkError> {
        let action = Action::Cancel(BulkCancel { cancels });
        self.submit_batch(session, action, options).await
    }

    pub async fn cancel_by_cloid(
        &self,
        session: &WalletSession,
        cancels: Vec<CancelByCloidRequest>,
        options: &SubmitOptions,
    ) -> Result<Vec<OrderStatus>, SdkError> {
        let action = Action::CancelByCloid(BulkCancelByCloid { cancels });
        self.submit_batch(session, action, options).await
    }

    pub async fn modify(
        &self,
        session: &WalletSession,
        oid: u64,
        order: OrderRequest,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::Modify(ModifyRequest { oid, order });
        self.submit(session, action, options).await
    }

    pub async fn batch_modify(
        &self,
        session: &WalletSession,
        modifies: Vec<ModifyRequest>,
        options: &SubmitOptions,
    ) -> Result<Vec<OrderStatus>, SdkError> {
        let action = Action::BatchModify(BulkModify { modifies });
        self.submit_batch(session, action, options).await
    }

    /// Cancel all open orders at `time` (ms). `None` clears the schedule.
    pub async fn schedule_cancel(
        &self,
        session: &WalletSession,
        time: Option<u64>,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::ScheduleCancel(ScheduleCancel { time });
        self.submit(session, action, options).await
    }

    // ── TWAP ─────────────────────────────────────────────────────────────

    pub async fn twap_order(
        &self,
        session: &WalletSession,
        twap: TwapRequest,
        options: &SubmitOptions,
    ) -> Result<TwapStatus, SdkError> {
        self.submit(session, TwapOrder { twap }, options)
            .await?
            .twap_status()
    }

    pub async fn twap_cancel(
        &self,
        session: &WalletSession,
        asset: u32,
        twap_id: u64,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        self.submit(session, TwapCancel { asset, twap_id }, options)
            .await
    }

    // ── Account settings ─────────────────────────────────────────────────

    pub async fn update_leverage(
        &self,
        session: &WalletSession,
        asset: u32,
        is_cross: bool,
        leverage: u32,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = UpdateLeverage {
            asset,
            is_cross,
            leverage,
        };
        self.submit(session, action, options).await
    }

    /// Add (`ntli > 0`) or remove margin from an isolated position. `ntli` is in USD micro-units.
    pub async fn update_isolated_margin(
        &self,
        session: &WalletSession,
        asset: u32,
        is_buy: bool,
        ntli: i64,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::UpdateIsolatedMargin(UpdateIsolatedMargin {
            asset,
            is_buy,
            ntli,
        });
        self.submit(session, action, options).await
    }

    pub async fn toggle_spot_dusting(
        &self,
        session: &WalletSession,
        opt_out: bool,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = SpotUser {
            toggle_spot_dusting: ToggleSpotDusting { opt_out },
        };
        self.submit(session, action, options).await
    }

    pub async fn set_referrer(
        &self,
        session: &WalletSession,
        code: &str,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::SetReferrer(SetReferrer {
            code: code.to_string(),
        });
        self.submit(session, action, options).await
    }

    // ── Vaults ───────────────────────────────────────────────────────────

    /// Create a vault seeded with `initial_usd` (USD micro-units). Returns its address.
    ///
    /// Below the venue minimum this fails with
    /// `"Initial deposit in vault is less than $100"`.
    pub async fn create_vault(
        &self,
        session: &WalletSession,
        name: &str,
        description: &str,
        initial_usd: u64,
        options: &SubmitOptions,
    ) -> Result<Address, SdkError> {
        let action = CreateVault::new(name, description, initial_usd);
        self.submit(session, action, options)
            .await?
            .vault_address()
    }

    pub async fn vault_transfer(
        &self,
        session: &WalletSession,
        vault_address: Address,
        is_deposit: bool,
        usd: u64,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::VaultTransfer(VaultTransfer {
            vault_address,
            is_deposit,
            usd,
        });
        self.submit(session, action, options).await
    }

    // ── Transfers (user-signed) ──────────────────────────────────────────

    pub async fn usd_send(
        &self,
        session: &WalletSession,
        destination: Address,
        amount: &str,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        self.submit(session, UsdSend::new(destination, amount), options)
            .await
    }

    pub async fn spot_send(
        &self,
        session: &WalletSession,
        destination: Address,
        token: &str,
        amount: &str,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::SpotSend(SpotSend::new(destination, token, amount));
        self.submit(session, action, options).await
    }

    /// Withdraw USDC to `destination` on the bridge chain.
    pub async fn withdraw(
        &self,
        session: &WalletSession,
        destination: Address,
        amount: &str,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::Withdraw3(Withdraw3::new(destination, amount));
        self.submit(session, action, options).await
    }

    /// Move USDC between the spot and perp balances.
    pub async fn usd_class_transfer(
        &self,
        session: &WalletSession,
        amount: &str,
        to_perp: bool,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::UsdClassTransfer(UsdClassTransfer::new(amount, to_perp));
        self.submit(session, action, options).await
    }

    pub async fn approve_agent(
        &self,
        session: &WalletSession,
        agent_address: Address,
        agent_name: Option<String>,
        options: &SubmitOptions,
    ) -> Result<ExchangeResponse, SdkError> {
        let action = Action::ApproveAgent(ApproveAgent::new(agent_address, agent_name));
        self.submit(session, action, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Network, SignatureChainId};
    use crate::wallet::LocalAccount;

    const TEST_KEY: &str = "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";

    fn session(network: Network) -> WalletSession {
        WalletSession::new(LocalAccount::from_private_key(TEST_KEY).unwrap(), network)
    }

    #[tokio::test]
    async fn test_sign_binds_nonce_into_create_vault() {
        let client = HyperliquidClient::new(Network::Testnet).unwrap();
        let session = session(Network::Testnet);

        let request = client
            .exchange()
            .sign(&session, CreateVault::new("v", "d", 50_000_000), &SubmitOptions::default())
            .await
            .unwrap();
        match &request.action {
            Action::CreateVault(v) => assert_eq!(v.nonce, request.nonce),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(session.next_nonce(), request.nonce + 1);
    }

    #[tokio::test]
    async fn test_sign_user_action_uses_resolved_chain() {
        let client = HyperliquidClient::new(Network::Testnet).unwrap();
        let session = WalletSession::new(
            LocalAccount::from_private_key(TEST_KEY)
                .unwrap()
                .with_chain_id(1u64),
            Network::Testnet,
        );

        let request = client
            .exchange()
            .sign(&session, UsdSend::new(Address::zero(), "1"), &SubmitOptions::default())
            .await
            .unwrap();
        match &request.action {
            Action::UsdSend(send) => {
                assert_eq!(send.chain.signature_chain_id, SignatureChainId(1));
                assert_eq!(send.time, request.nonce);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sign_rejects_network_mismatch() {
        let client = HyperliquidClient::new(Network::Mainnet).unwrap();
        let session = session(Network::Testnet);
        let err = client
            .exchange()
            .sign(&session, UpdateLeverage { asset: 0, is_cross: true, leverage: 5 }, &SubmitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sign_is_deterministic_per_nonce() {
        let client = HyperliquidClient::new(Network::Mainnet).unwrap();
        let fixed = || {
            WalletSession::from_parts(
                std::sync::Arc::new(LocalAccount::from_private_key(TEST_KEY).unwrap()),
                Network::Mainnet,
                crate::wallet::ChainIdResolver::for_network(Network::Mainnet),
                crate::wallet::NonceCounter::with_clock(|| 1_700_000_000_000),
            )
        };
        let order = || {
            Action::Order(BulkOrder {
                orders: vec![OrderRequest::limit(0, true, "30000", "0.1", crate::domain::order::Tif::Gtc)],
                grouping: Grouping::Na,
                builder: None,
            })
        };

        let options = SubmitOptions::vault(Address::repeat_byte(0x11));
        let a = client.exchange().sign(&fixed(), order(), &options).await.unwrap();
        let b = client.exchange().sign(&fixed(), order(), &options).await.unwrap();
        assert_eq!(a.nonce, b.nonce);
        assert_eq!(a.signature, b.signature);
        assert_eq!(a.vault_address, Some(Address::repeat_byte(0x11)));
    }
}
