//! Operations for model-based testing.
//!
//! Operations represent every lifecycle-affecting input: host commands,
//! dismissal triggers, and the form's own close request. They are
//! generated randomly (proptest in the harness tests, `arbitrary` in the
//! fuzz targets) and applied to both the model and the real widget.

use arbitrary::Arbitrary;

/// Lifecycle-affecting inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Host calls open.
    Open,

    /// Host calls close.
    Close,

    /// The user presses Escape.
    EscapeKey,

    /// A pointer press lands on the overlay.
    BackdropPress {
        /// True when the press hit the backdrop rather than modal
        /// content.
        on_backdrop: bool,
    },

    /// The hosted form sends a close message.
    FormCloseMessage,

    /// Host releases the widget. Terminal.
    Destroy,
}
