//! Transport abstraction.
//!
//! # Data Flow
//! ```text
//! caller
//!     → Fetcher / SingleFlight / RetryFetch (all implement Transport)
//!     → innermost Transport (ReqwestTransport or a caller-supplied closure)
//!     → response or FetchError
//! ```
//!
//! # Design Decisions
//! - A transport is an injected capability; core logic never reaches for a
//!   default client on its own
//! - Every decorator has the same signature as what it wraps, so they stack
//! - Returned futures are `'static` so calls can be spawned

use std::future::Future;

use futures_util::future::BoxFuture;

use crate::error::FetchError;

pub mod http;
pub mod request;

pub use http::ReqwestTransport;
pub use request::FetchRequest;

/// An asynchronous request → response capability.
pub trait Transport: Send + Sync + 'static {
    type Response: Send + 'static;

    /// Perform one call. Implementations must abort when `request.signal` fires.
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> BoxFuture<'static, Result<Self::Response, FetchError>>;
}

impl<F, Fut, R> Transport for F
where
    F: Fn(FetchRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, FetchError>> + Send + 'static,
    R: Send + 'static,
{
    type Response = R;

    fn fetch(&self, request: FetchRequest) -> BoxFuture<'static, Result<R, FetchError>> {
        Box::pin(self(request))
    }
}
