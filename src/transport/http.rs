//! Default transport backed by `reqwest`.
//!
//! # Responsibilities
//! - Turn a [`FetchRequest`] into a `reqwest` call
//! - Race the call against the request's signal
//!
//! # Design Decisions
//! - Status codes are not inspected; a 5xx is still `Ok`
//! - Dropping the in-flight `reqwest` future is how the call is aborted

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::{Client, Response};

use crate::config::TransportConfig;
use crate::error::{ConfigError, FetchError};
use crate::transport::{FetchRequest, Transport};

/// HTTP transport over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client from configuration.
    pub fn from_config(config: &TransportConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if config.connect_timeout_secs > 0 {
            builder =
                builder.connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    type Response = Response;

    fn fetch(
        &self,
        request: FetchRequest,
    ) -> BoxFuture<'static, Result<Response, FetchError>> {
        let client = self.client.clone();
        Box::pin(async move {
            let FetchRequest {
                method,
                url,
                headers,
                body,
                signal,
            } = request;

            let mut builder = client.request(method, url).headers(headers);
            if let Some(body) = body {
                builder = builder.body(body);
            }
            let send = builder.send();

            match signal {
                Some(signal) => {
                    if let Some(reason) = signal.reason() {
                        return Err(FetchError::aborted(reason));
                    }
                    tokio::select! {
                        biased;
                        reason = signal.cancelled() => Err(FetchError::aborted(reason)),
                        res = send => res.map_err(FetchError::transport),
                    }
                }
                None => send.await.map_err(FetchError::transport),
            }
        })
    }
}
