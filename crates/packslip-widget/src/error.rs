//! Widget error types.

use packslip_core::config::ConfigError;
use packslip_proto::CODE_SUBMISSION_FAILED;
use thiserror::Error;

/// Errors surfaced by widget operations.
///
/// Display strings are host-facing: they reach the `on_error` callback
/// and, for submission failures, the hosted form, so they carry the exact
/// wire wording rather than Rust-style lowercase messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// Configuration is invalid. Fatal: the widget is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The embedded content failed to load. Recoverable via the
    /// user-triggered retry affordance.
    #[error("{reason}")]
    Load {
        /// Load failure description.
        reason: String,
    },

    /// The hosted form rejected its own inputs.
    #[error("Validation failed: {reason}")]
    Validation {
        /// Rejection reason reported by the form.
        reason: String,
    },

    /// The hosted form reported an internal failure.
    #[error("{reason}")]
    Form {
        /// Failure reason reported by the form.
        reason: String,
    },

    /// The submission failed: network, parse, status, or response format.
    #[error("{message}")]
    Submission {
        /// Failure description (response-derived where available).
        message: String,
        /// Machine-readable code carried by the response, if any.
        code: Option<String>,
    },
}

impl WidgetError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Only configuration errors are fatal; everything else leaves the
    /// widget usable and is reported through the error callback.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Load { .. }
            | Self::Validation { .. }
            | Self::Form { .. }
            | Self::Submission { .. } => false,
        }
    }

    /// Machine-readable code for the frame-bound failure payload.
    pub fn code(&self) -> &str {
        match self {
            Self::Submission { code: Some(code), .. } => code,
            _ => CODE_SUBMISSION_FAILED,
        }
    }
}
