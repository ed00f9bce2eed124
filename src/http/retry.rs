//! Retry policy for HTTP requests.

use std::time::Duration;

/// Retry policy for an HTTP request.
///
/// Only transport failures (connection refused, reset, dropped before a
/// response) are retried. Any response from the venue, error envelope or
/// error status alike, is returned as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Single attempt.
    None,
    /// Retry transport failures with linear backoff.
    Linear(RetryConfig),
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Linear(RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn max_retries(&self) -> u32 {
        match self {
            RetryPolicy::None => 0,
            RetryPolicy::Linear(c) => c.max_retries,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Linear(c) => c.delay_for_attempt(attempt),
        }
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    /// Delay added per attempt: the n-th retry waits `n * step_delay`.
    pub step_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            step_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Calculate delay for a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.step_delay
            .saturating_mul(attempt.saturating_add(1))
            .min(self.max_delay)
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Deadline for one logical request, retries included.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default_is_linear() {
        assert!(matches!(RetryPolicy::default(), RetryPolicy::Linear(_)));
        assert_eq!(RetryPolicy::default().max_retries(), 3);
        assert_eq!(RetryPolicy::None.max_retries(), 0);
    }

    #[test]
    fn test_retry_config_delay_is_linear() {
        let config = RetryConfig {
            max_retries: 3,
            step_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        };
        assert_eq!(config.delay_for_attempt(0).as_millis(), 100);
        assert_eq!(config.delay_for_attempt(1).as_millis(), 200);
        assert_eq!(config.delay_for_attempt(2).as_millis(), 300);
    }

    #[test]
    fn test_retry_config_delay_caps_at_max() {
        let config = RetryConfig {
            max_retries: 5,
            step_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(2500),
        };
        assert_eq!(config.delay_for_attempt(4).as_millis(), 2500);
        assert_eq!(config.delay_for_attempt(u32::MAX).as_millis(), 2500);
    }
}
