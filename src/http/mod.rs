//! HTTP transport layer — `HttpTransport` with a linear retry policy.

pub mod client;
pub mod retry;

pub use client::HttpTransport;
pub use retry::{HttpConfig, RetryConfig, RetryPolicy};
