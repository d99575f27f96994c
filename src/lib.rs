//! Retry, single-flight and group cancellation for async HTTP transports.

pub mod cancel;
pub mod config;
pub mod error;
pub mod group;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use cancel::{CancellationBroadcast, CancellationSignal, FETCH_REQUEST_ABORTED};
pub use config::FetcherConfig;
pub use error::{ConfigError, FetchError};
pub use group::{FetchChannel, Fetcher};
pub use resilience::{create_single_flight, ChannelState, RetryFetch, RetryPolicy, SingleFlight};
pub use transport::{FetchRequest, ReqwestTransport, Transport};
