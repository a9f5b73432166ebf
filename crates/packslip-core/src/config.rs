//! Widget configuration.
//!
//! Configuration is validated at construction and immutable afterwards
//! except through [`WidgetConfig::apply`], which merges an explicit
//! [`ConfigPatch`] field by field and re-validates. There is no dynamic
//! "assign any property" path.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Default visual theme tag passed through to the hosted form.
pub const DEFAULT_THEME: &str = "light";

/// Default locale tag passed through to the hosted form.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default hosted form location.
pub const DEFAULT_FORM_URL: &str = "https://forms.packslip.dev/index.html";

/// Errors from configuration construction or merging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The submission endpoint is required and must be non-empty.
    #[error("apiEndpoint is required in configuration")]
    MissingEndpoint,

    /// An exact origin restriction cannot be the empty string.
    #[error("form origin must be a non-empty origin or an explicit Any")]
    EmptyOrigin,

    /// The configured form URL could not be parsed when deriving the
    /// frame URL.
    #[error("invalid form URL: {reason}")]
    InvalidFormUrl {
        /// Description of the parse failure.
        reason: String,
    },
}

/// Origin policy for the inbound message channel and outbound frame posts.
///
/// Origin restriction is a required, explicit construction input:
/// accepting messages from anywhere is an opt-in development mode, never a
/// silent default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOrigin {
    /// Accept inbound messages only from this origin, and target outbound
    /// posts at it.
    Exact(String),

    /// Accept inbound messages from any origin. Development only.
    Any,
}

impl FormOrigin {
    /// Whether a message from `origin` passes this policy.
    pub fn allows(&self, origin: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == origin,
            Self::Any => true,
        }
    }

    /// The target-origin string for outbound frame posts (`"*"` for
    /// [`FormOrigin::Any`]).
    pub fn post_target(&self) -> &str {
        match self {
            Self::Exact(origin) => origin,
            Self::Any => "*",
        }
    }
}

impl Serialize for FormOrigin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.post_target())
    }
}

/// Widget configuration.
///
/// # Security
///
/// The `Debug` impl redacts `api_key` to prevent accidental logging of
/// credentials. The key is still serialized into the frame config blob:
/// the hosted form needs it, and the frame URL never leaves the page.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Submission endpoint. Required, non-empty.
    pub api_endpoint: String,

    /// Merchant API key. Empty string when unset.
    pub api_key: String,

    /// Hosted form location the frame points at.
    pub form_url: String,

    /// Origin policy for the message channel.
    pub form_origin: FormOrigin,

    /// Visual theme tag, opaque to the widget.
    pub theme: String,

    /// Locale tag, opaque to the widget.
    pub language: String,

    /// Close the modal automatically two seconds after a successful
    /// submission.
    pub auto_close: bool,

    /// Presentation overrides, opaque to the widget and forwarded to the
    /// hosted form via the frame config blob.
    pub custom_styles: BTreeMap<String, String>,
}

impl WidgetConfig {
    /// Create a configuration with the required fields and defaults for
    /// the rest.
    ///
    /// # Errors
    ///
    /// Fails before any widget state exists if the endpoint is empty or
    /// the origin restriction is the empty string.
    pub fn new(
        api_endpoint: impl Into<String>,
        form_origin: FormOrigin,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            api_endpoint: api_endpoint.into(),
            api_key: String::new(),
            form_url: DEFAULT_FORM_URL.to_string(),
            form_origin,
            theme: DEFAULT_THEME.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            auto_close: true,
            custom_styles: BTreeMap::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Merge a partial configuration field by field.
    ///
    /// # Errors
    ///
    /// The merge is atomic: a patch that would leave the configuration
    /// invalid (empty endpoint, empty exact origin) is rejected whole and
    /// the live configuration is untouched.
    pub fn apply(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        let mut merged = self.clone();
        if let Some(api_endpoint) = patch.api_endpoint {
            merged.api_endpoint = api_endpoint;
        }
        if let Some(api_key) = patch.api_key {
            merged.api_key = api_key;
        }
        if let Some(form_url) = patch.form_url {
            merged.form_url = form_url;
        }
        if let Some(form_origin) = patch.form_origin {
            merged.form_origin = form_origin;
        }
        if let Some(theme) = patch.theme {
            merged.theme = theme;
        }
        if let Some(language) = patch.language {
            merged.language = language;
        }
        if let Some(auto_close) = patch.auto_close {
            merged.auto_close = auto_close;
        }
        if let Some(custom_styles) = patch.custom_styles {
            merged.custom_styles = custom_styles;
        }
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// The serialized configuration blob the hosted form self-configures
    /// from (carried in the frame URL `config` parameter).
    pub fn frame_config_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if matches!(&self.form_origin, FormOrigin::Exact(origin) if origin.trim().is_empty()) {
            return Err(ConfigError::EmptyOrigin);
        }
        Ok(())
    }
}

impl std::fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_key", &format!("<redacted {} bytes>", self.api_key.len()))
            .field("form_url", &self.form_url)
            .field("form_origin", &self.form_origin)
            .field("theme", &self.theme)
            .field("language", &self.language)
            .field("auto_close", &self.auto_close)
            .field("custom_styles", &self.custom_styles)
            .finish()
    }
}

/// Explicit partial configuration for [`WidgetConfig::apply`].
///
/// Every updatable field is enumerated; absent fields leave the live
/// configuration untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    /// Replacement submission endpoint.
    pub api_endpoint: Option<String>,

    /// Replacement API key.
    pub api_key: Option<String>,

    /// Replacement hosted form location.
    pub form_url: Option<String>,

    /// Replacement origin policy.
    pub form_origin: Option<FormOrigin>,

    /// Replacement theme tag.
    pub theme: Option<String>,

    /// Replacement locale tag.
    pub language: Option<String>,

    /// Replacement auto-close flag.
    pub auto_close: Option<bool>,

    /// Replacement presentation overrides (wholesale, not merged).
    pub custom_styles: Option<BTreeMap<String, String>>,
}

impl ConfigPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
