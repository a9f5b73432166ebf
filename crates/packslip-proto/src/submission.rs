//! HTTP submission request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Request header carrying the merchant API key (empty string if unset).
pub const HEADER_API_KEY: &str = "X-API-Key";

/// Request header carrying the protocol version marker.
pub const HEADER_SDK_VERSION: &str = "X-SDK-Version";

/// Submission request body: the collected form fields flattened at the top
/// level, merged with a [`SubmissionMetadata`] block.
///
/// A form field named `metadata` is shadowed by the metadata block, same as
/// the original wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionBody {
    /// Collected form fields, opaque to the widget.
    #[serde(flatten)]
    pub form: Map<String, Value>,

    /// Client-side provenance block.
    pub metadata: SubmissionMetadata,
}

/// Provenance attached to every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    /// Protocol version of the submitting widget.
    pub sdk_version: String,

    /// Submission wall-clock time, ISO-8601 UTC.
    pub submitted_at: String,

    /// Client user-agent string.
    pub user_agent: String,
}

/// A submission ready for the transport: endpoint, credential, and the
/// serialized JSON body. The transport adds the standard headers and never
/// interprets the body.
///
/// # Security
///
/// The `Debug` impl redacts `api_key` so request logging cannot leak
/// credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct PreparedSubmission {
    /// Target endpoint for the `POST`.
    pub endpoint: String,

    /// Merchant API key; empty string when unset.
    pub api_key: String,

    /// Serialized [`SubmissionBody`].
    pub body: String,
}

impl PreparedSubmission {
    /// Serialize a submission body against the given endpoint.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        body: &SubmissionBody,
    ) -> Result<Self, ProtocolError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ProtocolError::Encode { reason: e.to_string() })?;
        Ok(Self { endpoint: endpoint.into(), api_key: api_key.into(), body })
    }
}

impl std::fmt::Debug for PreparedSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedSubmission")
            .field("endpoint", &self.endpoint)
            .field("api_key", &format!("<redacted {} bytes>", self.api_key.len()))
            .field("body", &self.body)
            .finish()
    }
}

/// Parsed submission response body.
///
/// Every field is optional: the response is trusted when it omits `success`
/// entirely or sets it truthy, and the error chain falls back field by
/// field. [`SubmissionResponse::from_value`] never fails; missing or
/// mistyped fields decode to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionResponse {
    /// Explicit success flag. `None` when the field is absent.
    pub success: Option<Value>,

    /// Top-level human-readable message.
    pub message: Option<String>,

    /// Shipment payload sub-object, verbatim.
    pub data: Option<Value>,

    /// Nested error detail.
    pub error: Option<ResponseFault>,
}

/// Nested `error` object in a failure response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFault {
    /// Failure description.
    pub message: Option<String>,

    /// Machine-readable failure code.
    pub code: Option<String>,
}

impl SubmissionResponse {
    /// Extract the typed fields from an already-parsed response body.
    pub fn from_value(body: &Value) -> Self {
        let message = body.get("message").and_then(Value::as_str).map(String::from);
        let error = body.get("error").map(|e| ResponseFault {
            message: e.get("message").and_then(Value::as_str).map(String::from),
            code: e.get("code").and_then(Value::as_str).map(String::from),
        });
        Self {
            success: body.get("success").cloned(),
            message,
            data: body.get("data").cloned(),
            error,
        }
    }

    /// Whether the body carries an explicitly falsy `success` field.
    ///
    /// A response is trusted only if it omits the field entirely or sets it
    /// truthy; `false`, `0`, `""`, and `null` all veto. Truthiness follows
    /// the original wire contract, not JSON types.
    pub fn success_vetoed(&self) -> bool {
        match &self.success {
            None => false,
            Some(Value::Null) => true,
            Some(Value::Bool(b)) => !b,
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    /// Failure description for a non-success status.
    ///
    /// Priority: nested `error.message`, then top-level `message`, then a
    /// generic fallback naming the status.
    pub fn failure_message(&self, status: u16) -> String {
        self.error
            .as_ref()
            .and_then(|e| e.message.clone())
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| format!("Submission failed with status {status}"))
    }

    /// Machine-readable failure code carried by the response, if any.
    pub fn failure_code(&self) -> Option<String> {
        self.error.as_ref().and_then(|e| e.code.clone())
    }

    /// Typed view of the `data` sub-object.
    pub fn shipment(&self) -> ShipmentData {
        self.data.as_ref().map(ShipmentData::from_value).unwrap_or_default()
    }
}

/// Typed shipment fields extracted from the response `data` sub-object.
///
/// Any of these may be absent; absence passes through to the form
/// acknowledgement rather than becoming an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentData {
    /// Carrier tracking number.
    pub tracking_number: Option<String>,

    /// Shipment identifier (`data.id` on the wire).
    pub id: Option<String>,

    /// Delivery estimate.
    pub estimated_delivery: Option<String>,
}

impl ShipmentData {
    fn from_value(data: &Value) -> Self {
        let field = |name: &str| data.get(name).and_then(Value::as_str).map(String::from);
        Self {
            tracking_number: field("tracking_number"),
            id: field("id"),
            estimated_delivery: field("estimated_delivery"),
        }
    }
}
