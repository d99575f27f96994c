//! Request descriptor handed to transports.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::cancel::CancellationSignal;

/// Everything a transport needs to perform one call.
///
/// Retries resend a clone of the same descriptor, so the body is kept in
/// memory.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Signal the transport must honor by aborting when it fires.
    pub signal: Option<CancellationSignal>,
}

impl FetchRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            signal: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn signal(mut self, signal: CancellationSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Replace the signal with one that also fires when `own` fires.
    pub(crate) fn attach_signal(&mut self, own: &CancellationSignal) {
        let combined = match &self.signal {
            Some(caller) => CancellationSignal::any([own, caller]),
            None => CancellationSignal::any([own]),
        };
        self.signal = Some(combined);
    }
}
