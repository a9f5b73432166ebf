//! Fuzz target for the inbound form event decoder
//!
//! The inbound channel is ambient: any page script can post anything.
//! Decoding must be total and must never misclassify foreign traffic.
//!
//! # Invariants
//!
//! - NEVER panic on any byte sequence
//! - Non-JSON and untagged payloads decode to foreign (`Ok(None)`)
//! - `Err` only ever occurs for payloads carrying a known type tag
//! - Decoding is deterministic: same bytes, same result

#![no_main]

use libfuzzer_sys::fuzz_target;
use packslip_proto::decode_form_event;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    let first = decode_form_event(&raw);
    let second = decode_form_event(&raw);
    assert_eq!(first, second, "decode must be deterministic");

    match first {
        Ok(Some(envelope)) => {
            // Recognized events always carry one of the five known tags.
            assert!(envelope.event.tag().starts_with("SHIPPING_FORM_"));
        },
        Ok(None) => {},
        Err(_) => {
            // Malformed events are only reported for known tags, which
            // requires the payload to have been valid JSON with a type.
            let value: serde_json::Value =
                serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);
            assert!(value.get("type").is_some(), "error without a type tag");
        },
    }
});
