//! Domain modules organized as vertical slices.
//!
//! Each slice holds the wire types for one family of actions or queries:
//! - `order` — orders, cancels, modifies and their per-element statuses
//! - `twap`, `vault`, `account`, `transfer` — the remaining exchange actions
//! - `staking` — typed staking / validator query responses
//! - `info` — info endpoint request bodies
//!
//! `action` ties the exchange payloads together into one tagged enum and
//! `exchange` holds the signed request body and the response envelope.

pub mod account;
pub mod action;
pub mod exchange;
pub mod info;
pub mod order;
pub mod staking;
pub mod transfer;
pub mod twap;
pub mod vault;
