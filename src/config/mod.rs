//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FetcherConfig (validated, immutable)
//!     → RetryPolicy / ReqwestTransport built from it
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - `RetryPolicy::new` re-checks the retry count, so policies built in code
//!   are held to the same rule

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{FetcherConfig, RetryConfig, TransportConfig};
