//! Protocol error types.

use thiserror::Error;

/// Errors from encoding or decoding protocol payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// An envelope carried a known `type` tag but its payload did not
    /// match the expected shape for that tag.
    #[error("malformed {kind} event: {reason}")]
    MalformedEvent {
        /// The `type` tag of the offending envelope.
        kind: String,
        /// Description of the shape mismatch.
        reason: String,
    },

    /// A payload could not be serialized to JSON.
    #[error("encode error: {reason}")]
    Encode {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The configured form URL could not be parsed.
    #[error("invalid form URL: {reason}")]
    InvalidFormUrl {
        /// Description of the parse failure.
        reason: String,
    },
}
