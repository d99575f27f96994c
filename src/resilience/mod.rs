//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call on a channel:
//!     → single_flight.rs (abort the outstanding call, attach a fresh signal)
//!     → retries.rs (attempt, wait, attempt again; stop on abort)
//!     → inner transport
//! ```
//!
//! # Design Decisions
//! - Both layers implement `Transport`, so they compose in either order
//! - An abort is never mistaken for a transient failure

pub mod retries;
pub mod single_flight;

pub use retries::{RetryFetch, RetryPolicy};
pub use single_flight::{create_single_flight, ChannelState, SingleFlight, WeakSingleFlight};
