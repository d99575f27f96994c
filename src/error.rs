//! Error types shared by every layer.
//!
//! `FetchError` is what a wrapped transport call fails with.
//! `ConfigError` is raised while building components and is never retried.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Boxed error carried by transient transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for transport calls.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors returned from a transport call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The call was cancelled: locally, by a superseding call, or by a group cancel.
    #[error("{reason}")]
    Aborted { reason: String },

    /// Any other transport failure. Eligible for retry.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The retry loop fell through without a result.
    #[error("All retry attempts failed ({attempts} attempts)")]
    RetriesExhausted { attempts: u32 },
}

impl FetchError {
    /// Build an abort failure carrying the given reason.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    /// Wrap an arbitrary transport failure.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// True when the failure is a cancellation rather than a transport fault.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }

    /// Abort reason, if this is an abort.
    pub fn abort_reason(&self) -> Option<&str> {
        match self {
            Self::Aborted { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Errors raised while constructing components or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Retry count must be greater than 0 (got {0})")]
    InvalidRetryCount(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
