//! Frame URL construction.
//!
//! The hosted form self-configures from its own URL: the widget serializes
//! the full configuration into the query string along with the protocol
//! version, an instance correlation tag, and a load timestamp. No other
//! configuration channel exists between host and form.

use url::Url;

use crate::{PROTOCOL_VERSION, error::ProtocolError};

/// Sandbox grants the embedder must apply to the mounted frame.
///
/// The form runs with scripts, same-origin storage, and form submission
/// and nothing broader, regardless of what the hosted page requests.
pub const FRAME_SANDBOX_ALLOW: &[&str] = &["allow-scripts", "allow-same-origin", "allow-forms"];

/// Accessible title for the mounted frame.
pub const FRAME_TITLE: &str = "Shipping Information Form";

/// Build the self-configuring frame URL.
///
/// Query parameters:
///
/// - `config`: the serialized widget configuration (JSON)
/// - `sdk_version`: [`PROTOCOL_VERSION`], for schema selection
/// - `instance`: the widget's correlation tag, echoed back on every
///   inbound message
/// - `timestamp`: load wall-clock time in milliseconds (cache busting)
pub fn build_frame_url(
    form_url: &str,
    config_json: &str,
    instance: &str,
    timestamp_ms: u64,
) -> Result<Url, ProtocolError> {
    let mut url = Url::parse(form_url)
        .map_err(|e| ProtocolError::InvalidFormUrl { reason: e.to_string() })?;

    url.query_pairs_mut()
        .append_pair("config", config_json)
        .append_pair("sdk_version", PROTOCOL_VERSION)
        .append_pair("instance", instance)
        .append_pair("timestamp", &timestamp_ms.to_string());

    Ok(url)
}
