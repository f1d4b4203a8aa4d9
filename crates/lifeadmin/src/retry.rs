//! Exponential-backoff retry for outbound collaborator calls.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::integrations::IntegrationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2000
}

fn default_multiplier() -> u32 {
    2
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// A single attempt with no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            multiplier: 1,
        }
    }

    /// Retries without sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            multiplier: 1,
        }
    }

    /// Wait before retry number `retry` (0-based): `base * multiplier^retry`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = u64::from(self.multiplier).saturating_pow(retry);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// The waits between attempts for a call that fails every time.
    pub fn delays(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|i| self.delay_for(i))
            .collect()
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// `max_attempts` is reached. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, service: &str, mut op: F) -> Result<T, IntegrationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, IntegrationError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts && e.is_retryable() => {
                    let wait = self.delay_for(attempt - 1);
                    warn!(
                        service,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Call failed, retrying"
                    );
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> IntegrationError {
        IntegrationError::Status {
            service: "test".to_string(),
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_default_matches_backoff_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay_ms, 2000);
        assert_eq!(policy.multiplier, 2);
    }

    #[test]
    fn test_delays_double() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay_ms: 100,
            multiplier: 2,
        };
        assert_eq!(
            policy.delays(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400)
            ]
        );
        assert!(RetryPolicy::none().delays().is_empty());
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::immediate(3)
            .run("test", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_at_max_attempts_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::immediate(3)
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            })
            .await;
        assert!(matches!(result, Err(IntegrationError::Status { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::immediate(5)
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(IntegrationError::Status {
                    service: "test".to_string(),
                    status: 400,
                    body: String::new(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_calls_once() {
        let calls = AtomicU32::new(0);
        let _ = RetryPolicy::immediate(0)
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, IntegrationError>(())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
