use std::future::Future;

use crate::request::PreparedRequest;

/// A response that made it back from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The request never produced a response (DNS, connect, reset, timeout).
#[derive(Debug, thiserror::Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Sends one prepared request. At most one network attempt per call; no
/// retries.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

#[cfg(feature = "http")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "http")]
mod reqwest_transport {
    use std::time::Duration;

    use super::{RawResponse, Transport, TransportError};
    use crate::error::Error;
    use crate::request::PreparedRequest;

    /// [`Transport`] over a shared `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        #[must_use]
        pub fn new(http: reqwest::Client) -> Self {
            Self { http }
        }

        /// Build a client with the given user agent and optional timeout.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Http`] if the TLS backend cannot be initialised.
        pub fn build(user_agent: &str, timeout: Option<Duration>) -> Result<Self, Error> {
            let mut builder = reqwest::Client::builder().user_agent(user_agent);
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            Ok(Self::new(builder.build()?))
        }
    }

    impl Transport for ReqwestTransport {
        async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
            let mut builder = self
                .http
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError(e.to_string()))?;

            Ok(RawResponse::new(status, body.to_vec()))
        }
    }
}
