//! Group cancellation.
//!
//! # Data Flow
//! ```text
//! Fetcher::create_fetch_function(config)
//!     → RetryFetch (delay interrupted by the shared broadcast)
//!     → SingleFlight (fresh channel)
//!     → weak handle subscribed to the broadcast
//!
//! Fetcher::cancel()
//!     → broadcast emit → every channel cancels → in-flight calls abort
//! ```
//!
//! # Design Decisions
//! - The broadcast is owned by the fetcher; listeners hold weak channel
//!   handles so dropping a channel does not leak it
//! - Direct `fetch` calls use one-shot listeners removed on completion

pub mod fetcher;

pub use fetcher::{FetchChannel, Fetcher};
