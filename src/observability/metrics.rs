//! Metrics collection.
//!
//! # Metrics
//! - `fetch_attempts_total` (counter): transport attempts by outcome
//! - `fetch_retries_total` (counter): waits scheduled before a retry
//! - `fetch_aborts_total` (counter): local aborts by source
//! - `fetch_group_cancels_total` (counter): `Fetcher::cancel` calls
//!
//! # Design Decisions
//! - Uses the `metrics` facade; without an installed recorder every call is
//!   a no-op

use metrics::counter;

/// Record one transport attempt (`success`, `failure` or `aborted`).
pub fn record_attempt(outcome: &'static str) {
    counter!("fetch_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_retry() {
    counter!("fetch_retries_total").increment(1);
}

/// Record a locally issued abort (`superseded` or `group`).
pub fn record_abort(source: &'static str) {
    counter!("fetch_aborts_total", "source" => source).increment(1);
}

pub fn record_group_cancel() {
    counter!("fetch_group_cancels_total").increment(1);
}
