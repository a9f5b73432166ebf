//! Merchant-facing callback registry.
//!
//! Each slot is an optional capability. Recoverable failures flow through
//! `on_error` exclusively; when the slot is absent they are logged and
//! swallowed, never thrown out of event handling.

use packslip_widget::{Notification, WidgetError};
use serde_json::Value;

type ValueFn = dyn Fn(&Value) + Send + Sync;
type ErrorFn = dyn Fn(&WidgetError) + Send + Sync;
type UnitFn = dyn Fn() + Send + Sync;

/// Optional host callbacks, one slot per lifecycle notification.
#[derive(Default)]
pub struct HostCallbacks {
    on_success: Option<Box<ValueFn>>,
    on_error: Option<Box<ErrorFn>>,
    on_close: Option<Box<UnitFn>>,
    on_load: Option<Box<UnitFn>>,
    on_submit: Option<Box<ValueFn>>,
}

impl HostCallbacks {
    /// An empty registry: every notification is logged and dropped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the response `data` sub-object (or the whole response
    /// body when `data` is absent) after a successful submission.
    #[must_use]
    pub fn on_success(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Called with every recoverable failure: load, validation, form, and
    /// submission errors.
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&WidgetError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Called after the modal closes, whatever triggered the close.
    #[must_use]
    pub fn on_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    /// Called when the embedded content finishes loading.
    #[must_use]
    pub fn on_load(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_load = Some(Box::new(f));
        self
    }

    /// Called with the collected form data as a submission starts.
    /// Fire-and-forget: the result is ignored.
    #[must_use]
    pub fn on_submit(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    /// Route a widget notification to its slot.
    pub(crate) fn dispatch(&self, notification: &Notification) {
        match notification {
            Notification::Loaded => {
                if let Some(f) = &self.on_load {
                    f();
                }
            },
            Notification::Closed => {
                if let Some(f) = &self.on_close {
                    f();
                }
            },
            Notification::Submitted(form) => {
                if let Some(f) = &self.on_submit {
                    f(form);
                }
            },
            Notification::Succeeded(data) => {
                if let Some(f) = &self.on_success {
                    f(data);
                }
            },
            Notification::Failed(error) => self.failed(error),
        }
    }

    /// Surface a recoverable failure.
    pub(crate) fn failed(&self, error: &WidgetError) {
        if let Some(f) = &self.on_error {
            f(error);
        } else {
            tracing::error!(%error, "widget error (no on_error callback configured)");
        }
    }
}

impl std::fmt::Debug for HostCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCallbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_load", &self.on_load.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use serde_json::json;

    use super::*;

    #[test]
    fn dispatch_routes_to_slots() {
        let closes = Arc::new(AtomicU32::new(0));
        let closes_seen = Arc::clone(&closes);
        let callbacks = HostCallbacks::new().on_close(move || {
            closes_seen.fetch_add(1, Ordering::SeqCst);
        });

        callbacks.dispatch(&Notification::Closed);
        callbacks.dispatch(&Notification::Closed);
        assert_eq!(closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_slots_swallow_notifications() {
        let callbacks = HostCallbacks::new();
        callbacks.dispatch(&Notification::Loaded);
        callbacks.dispatch(&Notification::Succeeded(json!({"id": "S1"})));
        callbacks.dispatch(&Notification::Failed(WidgetError::Form {
            reason: "Form error occurred".to_string(),
        }));
    }
}
