//! Cross-frame message types.
//!
//! Messages cross the host/form boundary as JSON envelopes of the shape
//! `{ "type": <tag>, "instance": <tag?>, "data": <payload?> }`. The `type`
//! tag is the discriminant; `instance` correlates a message with one widget
//! instance when several coexist on the same shared channel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Inbound tag: the hosted form finished booting.
const TYPE_READY: &str = "SHIPPING_FORM_READY";
/// Inbound tag: the hosted form requests dismissal.
const TYPE_CLOSE: &str = "SHIPPING_FORM_CLOSE";
/// Inbound tag: the hosted form collected shipping data.
const TYPE_SUBMIT: &str = "SHIPPING_FORM_SUBMIT";
/// Inbound tag: the hosted form rejected its own inputs.
const TYPE_VALIDATION_ERROR: &str = "SHIPPING_FORM_VALIDATION_ERROR";
/// Inbound tag: the hosted form hit an internal failure.
const TYPE_ERROR: &str = "SHIPPING_FORM_ERROR";

/// Fallback error code attached to submission failures that carry none.
pub const CODE_SUBMISSION_FAILED: &str = "SUBMISSION_FAILED";

/// Event emitted by the hosted form.
///
/// Unknown tags never reach this type: [`decode_form_event`] filters them
/// out as foreign traffic before constructing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The form booted and is ready for input. Informational only.
    Ready,

    /// The form asks the host to dismiss the modal.
    Close,

    /// The form collected shipping data and hands it to the host for
    /// submission. Field names and values are opaque to the widget.
    Submit(Map<String, Value>),

    /// The form rejected its own inputs.
    ValidationError(FormFault),

    /// The form hit an internal failure.
    Error(FormFault),
}

impl FormEvent {
    /// The wire tag for this event.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ready => TYPE_READY,
            Self::Close => TYPE_CLOSE,
            Self::Submit(_) => TYPE_SUBMIT,
            Self::ValidationError(_) => TYPE_VALIDATION_ERROR,
            Self::Error(_) => TYPE_ERROR,
        }
    }
}

/// Failure detail attached to validation and form error events.
///
/// Every field is optional on the wire; the widget substitutes default
/// reasons for absent messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFault {
    /// Human-readable failure description, if the form provided one.
    pub message: Option<String>,
}

impl FormFault {
    fn from_value(value: &Value) -> Self {
        let message = value.get("message").and_then(Value::as_str).map(String::from);
        Self { message }
    }
}

/// A decoded inbound envelope: the event plus its correlation tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEnvelope {
    /// Instance tag echoed by the hosted form, if it sent one.
    ///
    /// `None` means the form predates instance correlation; such messages
    /// are accepted by every widget on the channel.
    pub instance: Option<String>,

    /// The decoded form event.
    pub event: FormEvent,
}

/// Decode a raw channel payload into a form event.
///
/// The inbound channel is ambient and shared, so decoding filters by shape:
///
/// - `Ok(None)`: not our traffic: not JSON, not an object, no `type` tag,
///   or a tag this protocol version does not know. Ignored silently
///   (forward compatibility).
/// - `Ok(Some(_))`: a recognized form event.
/// - `Err(_)`: a known tag whose payload is malformed. The caller logs and
///   drops these; they never reach host callbacks.
pub fn decode_form_event(raw: &str) -> Result<Option<InboundEnvelope>, ProtocolError> {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return Ok(None);
    };
    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return Ok(None);
    };

    let data = value.get("data");
    let event = match kind {
        TYPE_READY => FormEvent::Ready,
        TYPE_CLOSE => FormEvent::Close,
        TYPE_SUBMIT => {
            let form = data.and_then(Value::as_object).ok_or_else(|| {
                ProtocolError::MalformedEvent {
                    kind: kind.to_string(),
                    reason: "data is not an object".to_string(),
                }
            })?;
            FormEvent::Submit(form.clone())
        },
        TYPE_VALIDATION_ERROR => {
            FormEvent::ValidationError(data.map(FormFault::from_value).unwrap_or_default())
        },
        TYPE_ERROR => FormEvent::Error(data.map(FormFault::from_value).unwrap_or_default()),
        _ => return Ok(None),
    };

    let instance = value.get("instance").and_then(Value::as_str).map(String::from);

    Ok(Some(InboundEnvelope { instance, event }))
}

/// Message sent by the host into the hosted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum HostMessage {
    /// The submission reached the API and was accepted.
    #[serde(rename = "SUBMISSION_SUCCESS")]
    SubmissionSucceeded(SubmissionAck),

    /// The submission failed at any stage (network, parse, status, format).
    #[serde(rename = "SUBMISSION_ERROR")]
    SubmissionFailed(SubmissionFault),
}

impl HostMessage {
    /// Encode for delivery over the frame channel.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode { reason: e.to_string() })
    }
}

/// Success payload relayed to the hosted form.
///
/// Every field is pass-through from the API response; absent response
/// fields stay absent here rather than becoming errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAck {
    /// Carrier tracking number from `data.tracking_number`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tracking_number: Option<String>,

    /// Shipment identifier from `data.id`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub shipment_id: Option<String>,

    /// Delivery estimate from `data.estimated_delivery`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estimated_delivery: Option<String>,

    /// Top-level response message, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

/// Failure payload relayed to the hosted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFault {
    /// Human-readable failure description.
    pub message: String,

    /// Machine-readable code: the error's own code when it carries one,
    /// [`CODE_SUBMISSION_FAILED`] otherwise.
    pub code: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decode_ready() {
        let envelope = decode_form_event(r#"{"type":"SHIPPING_FORM_READY"}"#).unwrap().unwrap();
        assert_eq!(envelope.event, FormEvent::Ready);
        assert_eq!(envelope.instance, None);
    }

    #[test]
    fn decode_submit_with_instance() {
        let raw = r#"{"type":"SHIPPING_FORM_SUBMIT","instance":"ab12","data":{"name":"Ada","city":"London"}}"#;
        let envelope = decode_form_event(raw).unwrap().unwrap();
        assert_eq!(envelope.instance.as_deref(), Some("ab12"));
        match envelope.event {
            FormEvent::Submit(form) => {
                assert_eq!(form.get("name").and_then(Value::as_str), Some("Ada"));
            },
            other => panic!("expected Submit, got {other:?}"),
        }
    }

    #[test]
    fn decode_submit_without_data_is_malformed() {
        let result = decode_form_event(r#"{"type":"SHIPPING_FORM_SUBMIT"}"#);
        assert!(matches!(result, Err(ProtocolError::MalformedEvent { .. })));
    }

    #[test]
    fn decode_validation_error_without_message() {
        let envelope =
            decode_form_event(r#"{"type":"SHIPPING_FORM_VALIDATION_ERROR","data":{}}"#)
                .unwrap()
                .unwrap();
        assert_eq!(envelope.event, FormEvent::ValidationError(FormFault { message: None }));
    }

    #[test]
    fn decode_error_with_message() {
        let envelope =
            decode_form_event(r#"{"type":"SHIPPING_FORM_ERROR","data":{"message":"boom"}}"#)
                .unwrap()
                .unwrap();
        assert_eq!(
            envelope.event,
            FormEvent::Error(FormFault { message: Some("boom".to_string()) })
        );
    }

    #[test]
    fn unknown_type_is_foreign() {
        assert_eq!(decode_form_event(r#"{"type":"SOME_FUTURE_EVENT","data":{}}"#).unwrap(), None);
    }

    #[test]
    fn unrelated_traffic_is_foreign() {
        assert_eq!(decode_form_event("not json at all").unwrap(), None);
        assert_eq!(decode_form_event(r#"{"kind":"other-widget"}"#).unwrap(), None);
        assert_eq!(decode_form_event("42").unwrap(), None);
    }

    #[test]
    fn encode_success_omits_absent_fields() {
        let message = HostMessage::SubmissionSucceeded(SubmissionAck {
            tracking_number: Some("T1".to_string()),
            shipment_id: None,
            estimated_delivery: None,
            message: None,
        });
        let json = message.encode().unwrap();
        assert!(json.contains(r#""type":"SUBMISSION_SUCCESS""#));
        assert!(json.contains(r#""tracking_number":"T1""#));
        assert!(!json.contains("shipment_id"));
    }

    #[test]
    fn encode_failure_roundtrip() {
        let message = HostMessage::SubmissionFailed(SubmissionFault {
            message: "bad address".to_string(),
            code: CODE_SUBMISSION_FAILED.to_string(),
        });
        let json = message.encode().unwrap();
        let decoded: HostMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, message);
    }

    mod properties {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            /// Arbitrary channel traffic never panics the decoder.
            #[test]
            fn decode_total_over_arbitrary_input(raw in ".*") {
                let _ = decode_form_event(&raw);
            }

            /// Tags outside the known set are always foreign, whatever the
            /// payload looks like.
            #[test]
            fn unknown_tags_are_foreign(tag in "[A-Z_]{1,24}", message in ".*") {
                prop_assume!(!tag.starts_with("SHIPPING_FORM_"));
                let raw = serde_json::json!({"type": tag, "data": {"message": message}});
                let decoded = decode_form_event(&raw.to_string());
                prop_assert_eq!(decoded, Ok(None));
            }
        }
    }
}
