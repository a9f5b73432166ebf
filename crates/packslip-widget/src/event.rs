//! Widget events and actions.
//!
//! Events flow in from the driver; actions flow back out. The widget
//! itself performs no I/O, so every observable effect (surface mutation,
//! scroll suppression, frame posts, the HTTP call, callback invocation,
//! the auto-close timer) appears here as an action.

use std::time::Duration;

use packslip_core::{ConfigPatch, HttpReply, TransportError};
use packslip_proto::{HostMessage, PreparedSubmission};
use serde_json::Value;

use crate::error::WidgetError;

/// Events fed into the widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Host requests the modal to open.
    Open,

    /// Host (or a dismissal trigger, or the scheduled auto-close)
    /// requests the modal to close.
    Close,

    /// Host releases the widget. All subsequent events are silent no-ops.
    Destroy,

    /// Host merges a partial configuration.
    UpdateConfig(ConfigPatch),

    /// The embedded content finished loading.
    FrameLoaded,

    /// The embedded content failed to load.
    FrameLoadFailed {
        /// Load failure description from the embedder.
        reason: String,
    },

    /// The user triggered the load-retry affordance.
    RetryLoad,

    /// A pointer press landed on the modal overlay.
    BackdropPressed {
        /// True when the press hit the backdrop itself rather than the
        /// modal content. Only backdrop presses dismiss.
        on_backdrop: bool,
    },

    /// The user pressed Escape.
    EscapePressed,

    /// A payload arrived on the shared message channel.
    MessageReceived {
        /// Origin of the sending context.
        origin: String,
        /// Raw payload text; shape-filtered by the protocol decoder.
        payload: String,
    },

    /// The transport finished a submission attempt.
    SubmissionResolved {
        /// Raw reply or the transport failure.
        outcome: Result<HttpReply, TransportError>,
    },
}

/// Actions produced by the widget for the driver to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetAction {
    /// Mount the overlay and embedded frame at this URL.
    MountSurface {
        /// Fully parameterized frame URL.
        frame_url: String,
    },

    /// Replace the embedded frame with a freshly parameterized URL
    /// (load retry).
    RemountSurface {
        /// Fully parameterized frame URL.
        frame_url: String,
    },

    /// Tear down the overlay and frame.
    UnmountSurface,

    /// Suppress (true) or restore (false) background scrolling on the
    /// host page.
    SetScrollLock(bool),

    /// Surface the load-failure retry affordance.
    ShowLoadRetry,

    /// Deliver a message into the embedded frame.
    ///
    /// Only emitted while a surface is mounted; a close that raced a
    /// submission suppresses the post, never errors it.
    PostToForm(HostMessage),

    /// Start the HTTP submission.
    BeginSubmission(PreparedSubmission),

    /// Close the modal after a fixed delay. Non-cancelable; firing after
    /// a manual close is a harmless no-op.
    ScheduleClose {
        /// Delay before the close event.
        delay: Duration,
    },

    /// Invoke a host callback.
    Notify(Notification),

    /// Emit a diagnostic message.
    Log {
        /// Severity.
        level: LogLevel,
        /// Message text.
        message: String,
    },
}

/// Host callback notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The embedded content loaded (`on_load`).
    Loaded,

    /// The modal closed (`on_close`).
    Closed,

    /// The form handed over data for submission (`on_submit`,
    /// fire-and-forget).
    Submitted(Value),

    /// The submission was accepted (`on_success`): the response `data`
    /// sub-object, or the whole response body when `data` is absent.
    Succeeded(Value),

    /// A recoverable failure (`on_error`).
    Failed(WidgetError),
}

/// Log severity for [`WidgetAction::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Lifecycle milestones.
    Info,
    /// Suspicious but handled input.
    Warn,
    /// Failures.
    Error,
}
