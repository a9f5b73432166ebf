//! Wire types for the packslip host/form message protocol.
//!
//! The widget and the hosted shipping form live on opposite sides of a
//! frame boundary and exchange tagged JSON envelopes over the embedder's
//! message channel. This crate owns every shape that crosses a boundary:
//!
//! - [`FormEvent`]: inbound events emitted by the hosted form
//! - [`HostMessage`]: outbound acknowledgements sent back into the form
//! - [`SubmissionBody`] / [`SubmissionResponse`]: the HTTP submission
//!   request and its parsed reply
//! - [`frame_url`]: construction of the self-configuring frame URL
//!
//! Decoding is shape-filtering by design: the inbound channel is shared
//! with arbitrary other traffic, so anything that does not carry a known
//! `type` tag decodes to "not ours" rather than an error.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
pub mod frame_url;
mod messages;
mod submission;

pub use error::ProtocolError;
pub use frame_url::{FRAME_SANDBOX_ALLOW, FRAME_TITLE, build_frame_url};
pub use messages::{
    CODE_SUBMISSION_FAILED, FormEvent, FormFault, HostMessage, InboundEnvelope, SubmissionAck,
    SubmissionFault, decode_form_event,
};
pub use submission::{
    HEADER_API_KEY, HEADER_SDK_VERSION, PreparedSubmission, ResponseFault, ShipmentData,
    SubmissionBody, SubmissionMetadata, SubmissionResponse,
};

/// Protocol/schema version advertised to the hosted form and the API.
///
/// Carried in the frame URL (`sdk_version`), the `X-SDK-Version` request
/// header, and the submission metadata block. The hosted form uses it to
/// select a compatible message schema.
pub const PROTOCOL_VERSION: &str = "2.0.0";
