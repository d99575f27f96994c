//! Group cancellation control object.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::cancel::{CancellationBroadcast, CancellationSignal};
use crate::config::{FetcherConfig, RetryConfig};
use crate::error::{ConfigError, FetchError};
use crate::observability::metrics;
use crate::resilience::{RetryFetch, RetryPolicy, SingleFlight};
use crate::transport::{FetchRequest, ReqwestTransport, Transport};

/// Channel minted by [`Fetcher::create_fetch_function`].
pub type FetchChannel<T> = SingleFlight<RetryFetch<T>>;

/// Mints single-flight, retrying channels that share one cancel broadcast.
///
/// [`cancel`](Self::cancel) aborts whatever every channel (and every direct
/// [`fetch`](Self::fetch)) currently has in flight.
pub struct Fetcher<T> {
    transport: Arc<T>,
    broadcast: CancellationBroadcast,
}

impl Fetcher<ReqwestTransport> {
    /// Fetcher over a default `reqwest` client.
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    /// Fetcher over a `reqwest` client built from configuration.
    pub fn from_config(config: &FetcherConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_transport(ReqwestTransport::from_config(
            &config.transport,
        )?))
    }
}

impl Default for Fetcher<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            broadcast: CancellationBroadcast::new(),
        }
    }

    /// Abort every request issued through this fetcher.
    pub fn cancel(&self) {
        tracing::info!(
            listeners = self.broadcast.listener_count(),
            "Group cancel requested"
        );
        metrics::record_group_cancel();
        self.broadcast.emit();
    }

    /// Create a new single-flight channel retrying according to `config`.
    ///
    /// The channel stays subscribed to the group cancel while it is alive;
    /// the first group cancel after it is dropped removes its listener.
    pub fn create_fetch_function(
        &self,
        config: &RetryConfig,
    ) -> Result<FetchChannel<T>, ConfigError> {
        let policy = RetryPolicy::try_from(config)?;
        let retry =
            RetryFetch::with_broadcast(self.transport.clone(), policy, self.broadcast.clone());
        let channel = SingleFlight::new(retry);

        let handle = channel.downgrade();
        self.broadcast.on_while(move || {
            let alive = handle.cancel();
            if alive {
                metrics::record_abort("group");
            }
            alive
        });

        tracing::debug!(
            channel = %channel.id(),
            retry_count = policy.retry_count(),
            wait_time = ?policy.wait_time(),
            "Channel created"
        );
        Ok(channel)
    }

    /// Issue one call directly, without single-flight or retry.
    ///
    /// A group cancel aborts it. Its listener is removed when the returned
    /// future completes or is dropped.
    pub fn fetch(
        &self,
        mut request: FetchRequest,
    ) -> BoxFuture<'static, Result<T::Response, FetchError>> {
        let own = CancellationSignal::new();
        request.attach_signal(&own);

        let listener_signal = own.clone();
        let guard = self
            .broadcast
            .once(move || {
                metrics::record_abort("group");
                listener_signal.abort();
            })
            .guard();

        let call = self.transport.fetch(request);
        Box::pin(async move {
            let result = call.await;
            drop(guard);
            result
        })
    }

    /// The shared broadcast every channel listens on.
    pub fn broadcast(&self) -> &CancellationBroadcast {
        &self.broadcast
    }
}
