//! Low-level HTTP transport — `HttpTransport`.
//!
//! POSTs JSON to `{base}/info` and `{base}/exchange`. Exchange replies are
//! returned as the raw envelope; interpreting it is the exchange client's job.

use crate::error::{HttpError, SdkError};
use crate::http::retry::{HttpConfig, RetryPolicy};
use crate::transport::{Endpoint, Transport};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing;

/// HTTP transport for the venue's request/response API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
    config: HttpConfig,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_config(base_url, HttpConfig::default())
    }

    pub fn with_config(base_url: &str, config: HttpConfig) -> Result<Self, SdkError> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(HttpError::Network)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// POST `body` to `path` under one deadline covering every attempt.
    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<Value, SdkError> {
        let url = format!("{}{}", self.base_url, path);
        let deadline = timeout.unwrap_or(self.config.timeout);
        match tokio::time::timeout(deadline, self.post_with_retry(&url, body)).await {
            Ok(result) => result.map_err(SdkError::from),
            Err(_) => {
                tracing::warn!(url = %url, timeout_ms = deadline.as_millis() as u64, "Request timed out");
                Err(SdkError::Timeout(deadline))
            }
        }
    }

    async fn post_with_retry(&self, url: &str, body: &Value) -> Result<Value, HttpError> {
        let retry = &self.config.retry;
        if matches!(retry, RetryPolicy::None) {
            return self.do_request(url, body).await;
        }

        let max_retries = retry.max_retries();
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.do_request(url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        HttpError::Network(re) => re.is_connect() || re.is_request(),
                        _ => false,
                    };

                    if should_retry && attempt < max_retries {
                        let delay = retry.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = max_retries,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying request to {}",
                            url
                        );
                        tokio::time::sleep(delay).await;
                        last_error = Some(e);
                    } else if should_retry {
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request(&self, url: &str, body: &Value) -> Result<Value, HttpError> {
        let resp = self.client.post(url).json(body).send().await?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<Value>().await?;
            return Ok(parsed);
        }

        let status_code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            429 => Err(HttpError::RateLimited),
            400..=499 => Err(HttpError::BadRequest {
                status: status_code,
                body: body_text,
            }),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        endpoint: Endpoint,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, SdkError> {
        self.post(endpoint.path(), &payload, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let http = HttpTransport::new("https://api.hyperliquid.xyz/").unwrap();
        assert_eq!(http.base_url(), "https://api.hyperliquid.xyz");
    }

    #[tokio::test]
    async fn test_connection_refused_exhausts_retries() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let http = HttpTransport::with_config(
            &format!("http://127.0.0.1:{port}"),
            HttpConfig {
                timeout: Duration::from_secs(5),
                retry: RetryPolicy::Linear(crate::http::RetryConfig {
                    max_retries: 2,
                    step_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(5),
                }),
            },
        )
        .unwrap();

        let err = http
            .request(Endpoint::Info, serde_json::json!({"type": "meta"}), None)
            .await
            .unwrap_err();
        match err {
            SdkError::Http(HttpError::MaxRetriesExceeded { attempts, .. }) => {
                assert_eq!(attempts, 3)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
