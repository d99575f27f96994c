//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FetcherConfig {
    /// Retry policy for channels created from this config.
    pub retry: RetryConfig,

    /// Default HTTP transport settings.
    pub transport: TransportConfig,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first. Must be at least 1.
    pub retry_count: u32,

    /// Delay between attempts in milliseconds.
    pub wait_time_ms: u64,
}

impl RetryConfig {
    /// Defaults for channels minted by a `Fetcher`: a single attempt.
    pub fn channel_default() -> Self {
        Self {
            retry_count: 1,
            ..Self::default()
        }
    }
}

impl Default for RetryConfig {
    /// Defaults for a standalone `RetryFetch`.
    fn default() -> Self {
        Self {
            retry_count: 3,
            wait_time_ms: 1000,
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// TCP connect timeout in seconds (0 = client default).
    pub connect_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            user_agent: concat!("fetch-control/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
