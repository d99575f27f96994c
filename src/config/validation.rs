//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (retry count ≥ 1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FetcherConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::FetcherConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("retry.retry_count must be at least 1 (got {0})")]
    RetryCount(u32),

    #[error("transport.user_agent must not be empty")]
    EmptyUserAgent,
}

/// Check a loaded configuration.
pub fn validate_config(config: &FetcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.retry.retry_count < 1 {
        errors.push(ValidationError::RetryCount(config.retry.retry_count));
    }

    if config.transport.user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
