//! Transport seam for the HTTP submission.
//!
//! The state machine prepares a submission and interprets the reply; the
//! transport only moves bytes. Production uses an HTTP client, simulations
//! script replies, and neither side interprets status or body.

use async_trait::async_trait;
use packslip_proto::PreparedSubmission;
use thiserror::Error;

/// Raw transport reply: status plus body text, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,

    /// Response body text; parsed as JSON by the state machine.
    pub body: String,
}

/// Errors below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, TLS, abort).
    #[error("network error: {reason}")]
    Network {
        /// Description of the failure.
        reason: String,
    },

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {reason}")]
    Body {
        /// Description of the failure.
        reason: String,
    },
}

/// Async seam to the HTTP stack.
///
/// One call per Submit event; the widget offers no queueing, retry, or
/// cancellation, and imposes no timeout of its own (the transport's
/// defaults apply, which is a documented gap rather than a guarantee).
#[async_trait]
pub trait SubmissionTransport: Send + Sync + 'static {
    /// `POST` the prepared submission and return the raw reply.
    async fn submit(&self, request: &PreparedSubmission) -> Result<HttpReply, TransportError>;
}
