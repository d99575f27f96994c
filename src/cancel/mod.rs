//! Cancellation primitives.
//!
//! # Data Flow
//! ```text
//! Fetcher::cancel()
//!     → broadcast.rs (emit "cancel" to every listener, in order)
//!     → SingleFlight::cancel() per channel
//!     → signal.rs (fire the channel's current signal)
//!     → combined signal attached to the request fires
//!     → transport observes it and fails with FetchError::Aborted
//! ```
//!
//! # Design Decisions
//! - Signals are write-once; reuse means replacing, never resetting
//! - The broadcast is an owned value, never global state
//! - Broadcast listeners run synchronously so a cancel is complete when
//!   `emit` returns

pub mod broadcast;
pub mod signal;

pub use broadcast::{
    CancellationBroadcast, Subscription, SubscriptionGuard, WaitOutcome, CANCEL_EVENT,
};
pub use signal::{CancellationSignal, FETCH_REQUEST_ABORTED};
