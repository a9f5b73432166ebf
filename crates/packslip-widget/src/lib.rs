//! Widget
//!
//! Action-based state machine for the packslip shipping form widget.
//! Owns the modal lifecycle (open/close/destroy, dismissal triggers, load
//! signals) and the submission protocol (inbound form events, the HTTP
//! submission flow, outbound acknowledgements).
//!
//! # Architecture
//!
//! The widget is a pure state machine that:
//! - Receives events from the driver (lifecycle commands, embedder
//!   signals, channel messages, transport completions)
//! - Produces actions for the driver to execute (mount/unmount the
//!   surface, post into the frame, start the HTTP call, notify callbacks)
//! - Uses the `Environment` trait for time and randomness (deterministic
//!   testing)
//!
//! # Components
//!
//! - [`Widget`]: the state machine, one per embedded form instance
//! - [`WidgetEvent`]: events fed into the widget
//! - [`WidgetAction`]: actions produced by the widget
//! - [`WidgetError`]: error taxonomy with fatal/recoverable classification

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod widget;

pub use error::WidgetError;
pub use event::{LogLevel, Notification, WidgetAction, WidgetEvent};
pub use packslip_core::{
    ConfigError, ConfigPatch, Environment, FormOrigin, HttpReply, Phase, SessionState,
    TransportError, WidgetConfig,
};
pub use widget::{AUTO_CLOSE_DELAY, Widget};
