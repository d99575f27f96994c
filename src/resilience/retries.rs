//! Retry logic.
//!
//! # Responsibilities
//! - Re-issue a failed call up to `retry_count` times
//! - Wait `wait_time` between attempts, cut short by a group cancel
//! - Never retry an abort
//!
//! # Design Decisions
//! - The wait never raises: a cancel only shortens the delay, the abort itself
//!   surfaces through the transport on the next attempt
//! - The last attempt's failure is the one returned

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::cancel::{CancellationBroadcast, WaitOutcome};
use crate::config::RetryConfig;
use crate::error::{ConfigError, FetchError};
use crate::observability::metrics;
use crate::transport::{FetchRequest, Transport};

/// Attempt budget and inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    retry_count: u32,
    wait_time: Duration,
}

impl RetryPolicy {
    /// Validate and build a policy. `retry_count` must be at least 1.
    pub fn new(retry_count: u32, wait_time: Duration) -> Result<Self, ConfigError> {
        if retry_count < 1 {
            return Err(ConfigError::InvalidRetryCount(retry_count));
        }
        Ok(Self {
            retry_count,
            wait_time,
        })
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }
}

impl Default for RetryPolicy {
    /// Three attempts, one second apart.
    fn default() -> Self {
        Self {
            retry_count: 3,
            wait_time: Duration::from_millis(1000),
        }
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = ConfigError;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        Self::new(config.retry_count, Duration::from_millis(config.wait_time_ms))
    }
}

/// Transport decorator that retries transient failures.
pub struct RetryFetch<T> {
    transport: Arc<T>,
    policy: RetryPolicy,
    broadcast: CancellationBroadcast,
}

impl<T: Transport> RetryFetch<T> {
    /// Wrap `transport` with a private cancel broadcast.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self::with_broadcast(Arc::new(transport), policy, CancellationBroadcast::new())
    }

    /// Wrap a shared transport; `broadcast` interrupts the inter-attempt wait.
    pub fn with_broadcast(
        transport: Arc<T>,
        policy: RetryPolicy,
        broadcast: CancellationBroadcast,
    ) -> Self {
        Self {
            transport,
            policy,
            broadcast,
        }
    }

    /// Validate `config` and wrap `transport`.
    pub fn from_config(transport: T, config: &RetryConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(transport, RetryPolicy::try_from(config)?))
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Broadcast whose `"cancel"` event shortens the inter-attempt wait.
    pub fn broadcast(&self) -> &CancellationBroadcast {
        &self.broadcast
    }
}

impl<T: Transport> Transport for RetryFetch<T> {
    type Response = T::Response;

    fn fetch(
        &self,
        request: FetchRequest,
    ) -> BoxFuture<'static, Result<T::Response, FetchError>> {
        let transport = self.transport.clone();
        let policy = self.policy;
        let broadcast = self.broadcast.clone();

        Box::pin(async move {
            let retry_count = policy.retry_count;

            for attempt in 0..retry_count {
                let err = match transport.fetch(request.clone()).await {
                    Ok(response) => {
                        metrics::record_attempt("success");
                        return Ok(response);
                    }
                    Err(e) => e,
                };

                if err.is_abort() {
                    metrics::record_attempt("aborted");
                    tracing::debug!(
                        attempt,
                        url = %request.url,
                        error = %err,
                        "Fetch aborted, not retrying"
                    );
                    return Err(err);
                }

                metrics::record_attempt("failure");

                if attempt + 1 == retry_count {
                    tracing::warn!(
                        attempt,
                        url = %request.url,
                        error = %err,
                        "Fetch failed, no attempts left"
                    );
                    return Err(err);
                }

                tracing::info!(
                    attempt,
                    url = %request.url,
                    delay = ?policy.wait_time,
                    error = %err,
                    "Fetch failed, retrying"
                );
                metrics::record_retry();

                if broadcast.wait_for_event(policy.wait_time).await == WaitOutcome::Fired {
                    tracing::debug!(attempt, "Retry wait interrupted by cancel");
                }
            }

            Err(FetchError::RetriesExhausted {
                attempts: retry_count,
            })
        })
    }
}
