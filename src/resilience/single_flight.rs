//! Single-flight channel.
//!
//! # Responsibilities
//! - Keep at most one call current per channel
//! - Abort the current call before a new one is issued
//! - Expose an explicit cancel
//!
//! # State Transitions
//! ```text
//! Idle    → Loading: fetch()
//! Loading → Loading: fetch() (previous signal aborted first)
//! Loading → Idle:    cancel(), or the current call completes
//! ```
//!
//! # Design Decisions
//! - Supersession happens when `fetch` is called, not when the returned
//!   future is first polled, so the old signal always fires before the new
//!   transport call is issued
//! - A completing call only resets the state if it is still the current one

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::future::BoxFuture;
use uuid::Uuid;

use crate::cancel::{CancellationSignal, FETCH_REQUEST_ABORTED};
use crate::error::FetchError;
use crate::observability::metrics;
use crate::transport::{FetchRequest, Transport};

/// Whether a channel has a call outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Loading,
}

#[derive(Debug)]
struct FlightState {
    signal: CancellationSignal,
    status: ChannelState,
    generation: u64,
}

impl FlightState {
    fn cancel(&mut self) {
        self.signal.abort_with(FETCH_REQUEST_ABORTED);
        self.status = ChannelState::Idle;
    }
}

/// Transport decorator allowing one outstanding call at a time.
///
/// Clones share the same channel.
pub struct SingleFlight<T> {
    id: Uuid,
    transport: Arc<T>,
    state: Arc<Mutex<FlightState>>,
}

impl<T> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            transport: self.transport.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T: Transport> SingleFlight<T> {
    pub fn new(transport: T) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    pub fn from_arc(transport: Arc<T>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport,
            state: Arc::new(Mutex::new(FlightState {
                signal: CancellationSignal::new(),
                status: ChannelState::Idle,
                generation: 0,
            })),
        }
    }
}

impl<T> SingleFlight<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ChannelState {
        self.lock().status
    }

    /// Abort the current call, if any, and return to `Idle`.
    pub fn cancel(&self) {
        tracing::debug!(channel = %self.id, "Cancelling channel");
        self.lock().cancel();
    }

    /// Handle that can cancel the channel without keeping it alive.
    pub fn downgrade(&self) -> WeakSingleFlight {
        WeakSingleFlight {
            id: self.id,
            state: Arc::downgrade(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Transport> Transport for SingleFlight<T> {
    type Response = T::Response;

    fn fetch(
        &self,
        mut request: FetchRequest,
    ) -> BoxFuture<'static, Result<T::Response, FetchError>> {
        let generation = {
            let mut state = self.lock();
            if state.status == ChannelState::Loading {
                tracing::debug!(
                    channel = %self.id,
                    url = %request.url,
                    "Superseding outstanding call"
                );
                metrics::record_abort("superseded");
                state.cancel();
            }

            state.signal = CancellationSignal::new();
            request.attach_signal(&state.signal);
            state.status = ChannelState::Loading;
            state.generation += 1;
            state.generation
        };

        let call = self.transport.fetch(request);
        let state = Arc::downgrade(&self.state);

        Box::pin(async move {
            let result = call.await;
            if let Some(state) = state.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if state.generation == generation {
                    state.status = ChannelState::Idle;
                }
            }
            result
        })
    }
}

/// Weak counterpart of [`SingleFlight`], used by broadcast listeners.
#[derive(Debug, Clone)]
pub struct WeakSingleFlight {
    id: Uuid,
    state: Weak<Mutex<FlightState>>,
}

impl WeakSingleFlight {
    /// Cancel the channel if it still exists.
    ///
    /// Returns false once the channel has been dropped.
    pub fn cancel(&self) -> bool {
        match self.state.upgrade() {
            Some(state) => {
                tracing::debug!(channel = %self.id, "Cancelling channel");
                state.lock().unwrap_or_else(PoisonError::into_inner).cancel();
                true
            }
            None => false,
        }
    }
}

/// Wrap `transport` so that each call supersedes the previous one.
pub fn create_single_flight<T: Transport>(transport: T) -> SingleFlight<T> {
    SingleFlight::new(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request() -> FetchRequest {
        FetchRequest::get(Url::parse("http://localhost/").unwrap())
    }

    #[tokio::test]
    async fn test_state_returns_to_idle_after_completion() {
        let channel = create_single_flight(|_req: FetchRequest| async {
            Ok::<_, FetchError>(7)
        });
        assert_eq!(channel.state(), ChannelState::Idle);

        let call = channel.fetch(request());
        assert_eq!(channel.state(), ChannelState::Loading);

        assert_eq!(call.await.unwrap(), 7);
        assert_eq!(channel.state(), ChannelState::Idle);
    }

    #[tokio::test]
    async fn test_cancel_on_idle_channel_is_noop() {
        let channel = create_single_flight(|_req: FetchRequest| async {
            Ok::<_, FetchError>(())
        });
        channel.cancel();
        channel.cancel();
        assert_eq!(channel.state(), ChannelState::Idle);

        channel.fetch(request()).await.unwrap();
    }

    #[tokio::test]
    async fn test_weak_handle_cancels() {
        let channel = create_single_flight(|req: FetchRequest| async move {
            let signal = req.signal.expect("signal attached");
            Err::<(), _>(FetchError::aborted(signal.cancelled().await))
        });
        let weak = channel.downgrade();

        let call = channel.fetch(request());
        assert!(weak.cancel());

        let err = call.await.unwrap_err();
        assert_eq!(err.abort_reason(), Some(FETCH_REQUEST_ABORTED));
        assert_eq!(channel.state(), ChannelState::Idle);
    }

    #[test]
    fn test_weak_handle_outlived_channel() {
        let channel = create_single_flight(|_req: FetchRequest| async {
            Ok::<_, FetchError>(())
        });
        let weak = channel.downgrade();
        drop(channel);
        assert!(!weak.cancel());
    }
}
