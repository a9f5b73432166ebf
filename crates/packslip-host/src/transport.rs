//! HTTP submission transport backed by reqwest.

use async_trait::async_trait;
use packslip_core::transport::{HttpReply, SubmissionTransport, TransportError};
use packslip_proto::{HEADER_API_KEY, HEADER_SDK_VERSION, PROTOCOL_VERSION, PreparedSubmission};
use reqwest::header::{ACCEPT, CONTENT_TYPE};

/// Production transport: one shared `reqwest::Client` per widget.
///
/// The client is built without a request timeout: this layer imposes none
/// of its own and relies on the transport stack's defaults, which is a
/// documented gap rather than a guarantee.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around an existing client (custom TLS roots,
    /// proxies, or timeouts configured by the integrator).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubmissionTransport for ReqwestTransport {
    async fn submit(&self, request: &PreparedSubmission) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(&request.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(HEADER_API_KEY, &request.api_key)
            .header(ACCEPT, "application/json")
            .header(HEADER_SDK_VERSION, PROTOCOL_VERSION)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| TransportError::Network { reason: e.to_string() })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body { reason: e.to_string() })?;

        Ok(HttpReply { status, body })
    }
}
