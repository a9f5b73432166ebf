//! Declarative initialization.
//!
//! A host page can mark an element with [`BOOTSTRAP_MARKER`] and describe
//! the widget entirely in attributes; once the page settles, the embedder
//! collects those attributes, builds a config here, and wires the element's
//! click to [`HostDriver::open`](crate::HostDriver::open).

use packslip_core::config::{ConfigError, FormOrigin, WidgetConfig};

/// Marker attribute identifying the auto-init element.
pub const BOOTSTRAP_MARKER: &str = "data-shipping-form";

/// Attribute naming the submission endpoint. Required; without it the
/// marked element is ignored.
pub const ATTR_API_ENDPOINT: &str = "data-api-endpoint";

/// Attribute carrying the merchant API key.
pub const ATTR_API_KEY: &str = "data-api-key";

/// Attribute selecting the visual theme.
pub const ATTR_THEME: &str = "data-theme";

/// Attribute restricting the hosted form origin.
pub const ATTR_FORM_ORIGIN: &str = "data-form-origin";

/// Build a configuration from a marked element's attributes.
///
/// Returns `Ok(None)` when the endpoint attribute is absent (the marker
/// is inert, matching the original auto-init), `Err` when the endpoint is
/// present but invalid.
///
/// An absent origin attribute falls back to [`FormOrigin::Any`] with a
/// warning; declarative installs predate the explicit-origin requirement.
pub fn config_from_attrs<'a>(
    attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<Option<WidgetConfig>, ConfigError> {
    let mut endpoint = None;
    let mut api_key = None;
    let mut theme = None;
    let mut origin = None;

    for (name, value) in attrs {
        match name {
            ATTR_API_ENDPOINT => endpoint = Some(value),
            ATTR_API_KEY => api_key = Some(value),
            ATTR_THEME => theme = Some(value),
            ATTR_FORM_ORIGIN => origin = Some(value),
            _ => {},
        }
    }

    let Some(endpoint) = endpoint else {
        return Ok(None);
    };

    let form_origin = match origin {
        Some(origin) => FormOrigin::Exact(origin.to_string()),
        None => {
            tracing::warn!("no {ATTR_FORM_ORIGIN} attribute; accepting messages from any origin");
            FormOrigin::Any
        },
    };

    let mut config = WidgetConfig::new(endpoint, form_origin)?;
    if let Some(api_key) = api_key {
        config.api_key = api_key.to_string();
    }
    if let Some(theme) = theme {
        config.theme = theme.to_string();
    }

    Ok(Some(config))
}
