//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! retries / single-flight / group cancel produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Channel IDs (UUID v4) flow through log fields
//! - Metrics are cheap and optional (facade without recorder)

pub mod logging;
pub mod metrics;
