//! The seam between the orchestration clients and the wire.
//!
//! Both the HTTP transport and the stream transport accept the same two kinds
//! of request: an info query, answered with the query's data, and a signed
//! exchange request, answered with the raw `{status, response}` envelope.

use crate::error::SdkError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Info,
    Exchange,
}

impl Endpoint {
    /// HTTP path under the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Info => "/info",
            Endpoint::Exchange => "/exchange",
        }
    }

    /// `request.type` of a stream post.
    pub fn post_kind(&self) -> &'static str {
        match self {
            Endpoint::Info => "info",
            Endpoint::Exchange => "action",
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and wait for its reply.
    ///
    /// `timeout` overrides the transport's configured deadline. Past it the
    /// call fails with [`SdkError::Timeout`]; the venue may still process it.
    async fn request(
        &self,
        endpoint: Endpoint,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, SdkError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn request(
        &self,
        endpoint: Endpoint,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, SdkError> {
        (**self).request(endpoint, payload, timeout).await
    }
}
