//! Exchange endpoint request body and result envelope.

#[cfg(feature = "http")]
pub mod client;

use crate::domain::action::Action;
use crate::domain::order::wire::{OrderStatus, StatusesData};
use crate::domain::twap::{TwapStatus, TwapStatusData};
use crate::error::{ApiRequestError, SdkError};
use crate::shared::{Address, RsvSignature};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Signed request body: `{action, nonce, signature, vaultAddress?, expiresAfter?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub action: Action,
    pub nonce: u64,
    pub signature: RsvSignature,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<u64>,
}

/// Raw `{status, response?, error?}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeEnvelope {
    pub status: String,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExchangeEnvelope {
    /// Split into the success payload or the venue's rejection.
    ///
    /// The rejection message is taken verbatim from `error`, or from `response`
    /// when the venue puts the text there.
    pub fn into_result(self) -> Result<ExchangeResponse, ApiRequestError> {
        if self.status == "ok" {
            let response = match self.response {
                Some(value) => serde_json::from_value::<ExchangeResponse>(value.clone())
                    .unwrap_or(ExchangeResponse {
                        kind: "unknown".into(),
                        data: Some(value),
                    }),
                None => ExchangeResponse {
                    kind: "default".into(),
                    data: None,
                },
            };
            return Ok(response);
        }

        let message = match (&self.error, &self.response) {
            (Some(error), _) => error.clone(),
            (None, Some(Value::String(text))) => text.clone(),
            (None, Some(other)) => other.to_string(),
            (None, None) => format!("request failed with status {:?}", self.status),
        };
        Err(ApiRequestError {
            message,
            response: self.response,
        })
    }
}

/// Successful exchange response: `{type, data?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ExchangeResponse {
    fn data_as<T: DeserializeOwned>(&self) -> Result<T, SdkError> {
        let data = self.data.clone().ok_or_else(|| {
            SdkError::Other(format!("{} response carries no data", self.kind))
        })?;
        Ok(serde_json::from_value(data)?)
    }

    /// One status per submitted element, in submission order.
    pub fn statuses(&self) -> Result<Vec<OrderStatus>, SdkError> {
        Ok(self.data_as::<StatusesData>()?.statuses)
    }

    pub fn twap_status(&self) -> Result<TwapStatus, SdkError> {
        Ok(self.data_as::<TwapStatusData>()?.status)
    }

    /// Address of a newly created vault.
    pub fn vault_address(&self) -> Result<Address, SdkError> {
        self.data_as::<Address>()
    }
}
