//! Order domain — placement, cancellation and modification wire types.
//!
//! Field names are the venue's single-letter keys. Declaration order is the
//! msgpack field order and therefore part of the signed hash.

pub mod wire;

use crate::shared::{Address, Cloid};
use serde::{Deserialize, Serialize};

pub use wire::{FilledOrder, OrderStatus, RestingOrder};

// ─── Order type ──────────────────────────────────────────────────────────────

/// Time in force for limit orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tif {
    /// Add liquidity only (post-only).
    Alo,
    /// Immediate or cancel.
    Ioc,
    /// Good til cancelled.
    Gtc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tpsl {
    Tp,
    Sl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub tif: Tif,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub is_market: bool,
    pub trigger_px: String,
    pub tpsl: Tpsl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderType {
    Limit(Limit),
    Trigger(Trigger),
}

/// How the orders of one bulk request relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Grouping {
    #[default]
    Na,
    NormalTpsl,
    PositionTpsl,
}

// ─── Order ───────────────────────────────────────────────────────────────────

/// A single order inside an `order` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "b")]
    pub is_buy: bool,
    #[serde(rename = "p")]
    pub limit_px: String,
    #[serde(rename = "s")]
    pub sz: String,
    #[serde(rename = "r")]
    pub reduce_only: bool,
    #[serde(rename = "t")]
    pub order_type: OrderType,
    #[serde(rename = "c", skip_serializing_if = "Option::is_none", default)]
    pub cloid: Option<Cloid>,
}

impl OrderRequest {
    /// A plain limit order.
    pub fn limit(
        asset: u32,
        is_buy: bool,
        limit_px: impl Into<String>,
        sz: impl Into<String>,
        tif: Tif,
    ) -> Self {
        Self {
            asset,
            is_buy,
            limit_px: limit_px.into(),
            sz: sz.into(),
            reduce_only: false,
            order_type: OrderType::Limit(Limit { tif }),
            cloid: None,
        }
    }

    /// A stop / take-profit order triggered at `trigger_px`.
    pub fn trigger(
        asset: u32,
        is_buy: bool,
        limit_px: impl Into<String>,
        sz: impl Into<String>,
        trigger_px: impl Into<String>,
        is_market: bool,
        tpsl: Tpsl,
    ) -> Self {
        Self {
            asset,
            is_buy,
            limit_px: limit_px.into(),
            sz: sz.into(),
            reduce_only: false,
            order_type: OrderType::Trigger(Trigger {
                is_market,
                trigger_px: trigger_px.into(),
                tpsl,
            }),
            cloid: None,
        }
    }

    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn with_cloid(mut self, cloid: Cloid) -> Self {
        self.cloid = Some(cloid);
        self
    }
}

/// Builder fee attached to an order action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderInfo {
    #[serde(rename = "b")]
    pub builder: Address,
    /// Fee in tenths of a basis point.
    #[serde(rename = "f")]
    pub fee: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOrder {
    pub orders: Vec<OrderRequest>,
    pub grouping: Grouping,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub builder: Option<BuilderInfo>,
}

// ─── Cancel ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "o")]
    pub oid: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCancel {
    pub cancels: Vec<CancelRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelByCloidRequest {
    pub asset: u32,
    pub cloid: Cloid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCancelByCloid {
    pub cancels: Vec<CancelByCloidRequest>,
}

/// Dead man's switch: cancel all open orders at `time` (ms), or clear it with `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleCancel {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub time: Option<u64>,
}

// ─── Modify ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyRequest {
    pub oid: u64,
    pub order: OrderRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkModify {
    pub modifies: Vec<ModifyRequest>,
}
