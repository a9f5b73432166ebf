//! Widget state machine.
//!
//! The `Widget` folds the modal lifecycle manager and the submission
//! coordinator into one event-driven state machine. Pure state machine -
//! returns actions, caller handles I/O.

use std::time::Duration;

use packslip_core::{
    config::{ConfigError, ConfigPatch, WidgetConfig},
    env::Environment,
    session::{Phase, SessionState},
    transport::{HttpReply, TransportError},
};
use packslip_proto::{
    FormEvent, FormFault, HostMessage, PROTOCOL_VERSION, PreparedSubmission, ProtocolError,
    SubmissionAck, SubmissionBody, SubmissionFault, SubmissionMetadata, SubmissionResponse,
    build_frame_url, decode_form_event,
};
use serde_json::{Map, Value};

use crate::{
    error::WidgetError,
    event::{LogLevel, Notification, WidgetAction, WidgetEvent},
};

/// Fixed delay between a successful submission and the scheduled
/// auto-close.
pub const AUTO_CLOSE_DELAY: Duration = Duration::from_secs(2);

/// Default reason when the form reports a validation failure without one.
const DEFAULT_VALIDATION_REASON: &str = "Please check your inputs";

/// Default reason when the form reports an error without one.
const DEFAULT_FORM_REASON: &str = "Form error occurred";

/// Default reason when the embedder reports a load failure without one.
const DEFAULT_LOAD_REASON: &str = "Failed to load shipping form";

/// Host-facing message for a response body that is not JSON.
const INVALID_JSON_MESSAGE: &str = "Invalid JSON in API response";

/// Host-facing message for a response that vetoes its own success flag.
const INVALID_FORMAT_MESSAGE: &str = "Invalid API response format: missing success flag";

/// Widget state machine.
///
/// One instance per embedded form. Handles lifecycle commands, embedder
/// signals, channel messages, and transport completions; every observable
/// effect is returned as a [`WidgetAction`].
///
/// # Type Parameters
///
/// - `E`: Environment implementation for time/randomness
pub struct Widget<E: Environment> {
    /// Live configuration, validated at construction and on every patch.
    config: WidgetConfig,

    /// Modal lifecycle phase.
    session: SessionState,

    /// Correlation tag carried by the frame URL and echoed on inbound
    /// messages; disambiguates instances sharing one channel.
    instance_tag: String,

    /// Set by Destroy. Terminal: every later event is a silent no-op.
    destroyed: bool,

    /// Environment for time/randomness.
    env: E,
}

impl<E: Environment> Widget<E> {
    /// Create a widget around a validated configuration.
    pub fn new(env: E, config: WidgetConfig) -> Self {
        let instance_tag = format!("{:016x}", env.random_u64());
        Self { config, session: SessionState::new(), instance_tag, destroyed: false, env }
    }

    /// Current configuration.
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// The instance correlation tag.
    pub fn instance_tag(&self) -> &str {
        &self.instance_tag
    }

    /// Whether a surface is mounted.
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    /// Whether the embedded content is still loading.
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Whether the widget has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Process an event and return resulting actions.
    ///
    /// After Destroy this always returns no actions: no state change, no
    /// callbacks, no error.
    ///
    /// # Errors
    ///
    /// Returns `WidgetError` if the event cannot be processed. The driver
    /// routes these to the error callback; they never escape an event
    /// handler.
    pub fn handle(&mut self, event: WidgetEvent) -> Result<Vec<WidgetAction>, WidgetError> {
        if self.destroyed {
            return Ok(Vec::new());
        }

        match event {
            WidgetEvent::Open => self.handle_open(),
            WidgetEvent::Close => Ok(self.close_actions()),
            WidgetEvent::Destroy => self.handle_destroy(),
            WidgetEvent::UpdateConfig(patch) => self.handle_update_config(patch),
            WidgetEvent::FrameLoaded => Ok(self.handle_frame_loaded()),
            WidgetEvent::FrameLoadFailed { reason } => Ok(self.handle_frame_load_failed(reason)),
            WidgetEvent::RetryLoad => self.handle_retry_load(),
            WidgetEvent::BackdropPressed { on_backdrop } => {
                Ok(if on_backdrop { self.close_actions() } else { Vec::new() })
            },
            WidgetEvent::EscapePressed => Ok(self.close_actions()),
            WidgetEvent::MessageReceived { origin, payload } => {
                self.handle_message(&origin, &payload)
            },
            WidgetEvent::SubmissionResolved { outcome } => Ok(self.handle_submission(outcome)),
        }
    }

    /// Handle the open command.
    fn handle_open(&mut self) -> Result<Vec<WidgetAction>, WidgetError> {
        if self.session.is_open() {
            return Ok(vec![WidgetAction::Log {
                level: LogLevel::Warn,
                message: "shipping form is already open".to_string(),
            }]);
        }

        let frame_url = self.frame_url()?;
        self.session.set(Phase::Opening);

        Ok(vec![
            WidgetAction::MountSurface { frame_url },
            WidgetAction::SetScrollLock(true),
            WidgetAction::Log { level: LogLevel::Info, message: "shipping form opened".to_string() },
        ])
    }

    /// Close actions, shared by every dismissal path.
    ///
    /// No-op when already closed, which is what makes the scheduled
    /// auto-close and repeated Escape presses harmless.
    fn close_actions(&mut self) -> Vec<WidgetAction> {
        if !self.session.is_open() {
            return Vec::new();
        }

        self.session.set(Phase::Closed);

        vec![
            WidgetAction::UnmountSurface,
            WidgetAction::SetScrollLock(false),
            WidgetAction::Notify(Notification::Closed),
            WidgetAction::Log { level: LogLevel::Info, message: "shipping form closed".to_string() },
        ]
    }

    /// Handle destroy: force close, then go terminal.
    fn handle_destroy(&mut self) -> Result<Vec<WidgetAction>, WidgetError> {
        let mut actions = self.close_actions();
        self.destroyed = true;
        actions.push(WidgetAction::Log {
            level: LogLevel::Info,
            message: "shipping form widget destroyed".to_string(),
        });
        Ok(actions)
    }

    /// Merge a partial configuration.
    fn handle_update_config(
        &mut self,
        patch: ConfigPatch,
    ) -> Result<Vec<WidgetAction>, WidgetError> {
        self.config.apply(patch)?;
        Ok(vec![WidgetAction::Log {
            level: LogLevel::Info,
            message: "widget configuration updated".to_string(),
        }])
    }

    /// Handle the embedded content's load-complete signal.
    fn handle_frame_loaded(&mut self) -> Vec<WidgetAction> {
        if !self.session.is_loading() {
            return Vec::new();
        }

        self.session.set(Phase::Open);
        vec![
            WidgetAction::Notify(Notification::Loaded),
            WidgetAction::Log {
                level: LogLevel::Info,
                message: "shipping form loaded".to_string(),
            },
        ]
    }

    /// Handle the embedded content's load-failure signal.
    fn handle_frame_load_failed(&mut self, reason: String) -> Vec<WidgetAction> {
        if !self.session.is_open() {
            return Vec::new();
        }

        self.session.set(Phase::Open);
        let reason =
            if reason.trim().is_empty() { DEFAULT_LOAD_REASON.to_string() } else { reason };

        vec![
            WidgetAction::ShowLoadRetry,
            WidgetAction::Notify(Notification::Failed(WidgetError::Load {
                reason: reason.clone(),
            })),
            WidgetAction::Log { level: LogLevel::Error, message: reason },
        ]
    }

    /// Handle the user-triggered load retry.
    fn handle_retry_load(&mut self) -> Result<Vec<WidgetAction>, WidgetError> {
        if !self.session.is_open() {
            return Ok(Vec::new());
        }

        let frame_url = self.frame_url()?;
        self.session.set(Phase::Opening);

        Ok(vec![
            WidgetAction::RemountSurface { frame_url },
            WidgetAction::Log {
                level: LogLevel::Info,
                message: "retrying shipping form load".to_string(),
            },
        ])
    }

    /// Handle a payload from the shared message channel.
    fn handle_message(
        &mut self,
        origin: &str,
        payload: &str,
    ) -> Result<Vec<WidgetAction>, WidgetError> {
        if !self.config.form_origin.allows(origin) {
            return Ok(vec![WidgetAction::Log {
                level: LogLevel::Warn,
                message: format!("dropped message from untrusted origin {origin}"),
            }]);
        }

        let envelope = match decode_form_event(payload) {
            Ok(Some(envelope)) => envelope,
            // Foreign traffic on the shared channel. Silent.
            Ok(None) => return Ok(Vec::new()),
            Err(e) => {
                return Ok(vec![WidgetAction::Log {
                    level: LogLevel::Warn,
                    message: format!("dropped malformed form event: {e}"),
                }]);
            },
        };

        // Messages tagged for another instance are not ours. Untagged
        // messages predate correlation and are accepted.
        if envelope.instance.as_deref().is_some_and(|tag| tag != self.instance_tag) {
            return Ok(Vec::new());
        }

        match envelope.event {
            FormEvent::Ready => Ok(vec![WidgetAction::Log {
                level: LogLevel::Info,
                message: "shipping form is ready".to_string(),
            }]),
            FormEvent::Close => Ok(self.close_actions()),
            FormEvent::ValidationError(fault) => {
                Ok(vec![WidgetAction::Notify(Notification::Failed(WidgetError::Validation {
                    reason: fault_reason(fault, DEFAULT_VALIDATION_REASON),
                }))])
            },
            FormEvent::Error(fault) => {
                Ok(vec![WidgetAction::Notify(Notification::Failed(WidgetError::Form {
                    reason: fault_reason(fault, DEFAULT_FORM_REASON),
                }))])
            },
            FormEvent::Submit(form) => self.begin_submission(form),
        }
    }

    /// Start the submission sequence for collected form data.
    fn begin_submission(
        &mut self,
        form: Map<String, Value>,
    ) -> Result<Vec<WidgetAction>, WidgetError> {
        let body = SubmissionBody {
            form: form.clone(),
            metadata: SubmissionMetadata {
                sdk_version: PROTOCOL_VERSION.to_string(),
                submitted_at: self.env.timestamp_iso8601(),
                user_agent: self.env.user_agent(),
            },
        };

        let prepared =
            PreparedSubmission::new(&self.config.api_endpoint, &self.config.api_key, &body)
                .map_err(|e| WidgetError::Submission { message: e.to_string(), code: None })?;

        Ok(vec![
            WidgetAction::Notify(Notification::Submitted(Value::Object(form))),
            WidgetAction::BeginSubmission(prepared),
            WidgetAction::Log {
                level: LogLevel::Debug,
                message: "submitting shipping data".to_string(),
            },
        ])
    }

    /// Interpret a finished submission attempt.
    ///
    /// The frame may have been torn down while the request was in flight,
    /// so every frame-bound action is gated on the session still being
    /// open. Callbacks fire either way.
    fn handle_submission(
        &mut self,
        outcome: Result<HttpReply, TransportError>,
    ) -> Vec<WidgetAction> {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                return self.submission_failure(WidgetError::Submission {
                    message: e.to_string(),
                    code: None,
                });
            },
        };

        // Parse unconditionally; a non-JSON body is a generic failure.
        let Ok(raw) = serde_json::from_str::<Value>(&reply.body) else {
            return self.submission_failure(WidgetError::Submission {
                message: INVALID_JSON_MESSAGE.to_string(),
                code: None,
            });
        };

        let response = SubmissionResponse::from_value(&raw);

        if !(200..300).contains(&reply.status) {
            return self.submission_failure(WidgetError::Submission {
                message: response.failure_message(reply.status),
                code: response.failure_code(),
            });
        }

        // A response is trusted only if it omits the success flag or sets
        // it truthy.
        if response.success_vetoed() {
            return self.submission_failure(WidgetError::Submission {
                message: INVALID_FORMAT_MESSAGE.to_string(),
                code: None,
            });
        }

        let shipment = response.shipment();
        let ack = SubmissionAck {
            tracking_number: shipment.tracking_number,
            shipment_id: shipment.id,
            estimated_delivery: shipment.estimated_delivery,
            message: response.message.clone(),
        };

        let mut actions = Vec::new();
        if self.session.is_open() {
            actions.push(WidgetAction::PostToForm(HostMessage::SubmissionSucceeded(ack)));
        }
        actions.push(WidgetAction::Notify(Notification::Succeeded(
            response.data.clone().unwrap_or(raw),
        )));
        if self.config.auto_close {
            actions.push(WidgetAction::ScheduleClose { delay: AUTO_CLOSE_DELAY });
        }
        actions.push(WidgetAction::Log {
            level: LogLevel::Info,
            message: "shipping data submitted".to_string(),
        });
        actions
    }

    /// Failure half of the submission sequence.
    fn submission_failure(&self, error: WidgetError) -> Vec<WidgetAction> {
        let mut actions = vec![WidgetAction::Log {
            level: LogLevel::Error,
            message: format!("submission failed: {error}"),
        }];
        if self.session.is_open() {
            actions.push(WidgetAction::PostToForm(HostMessage::SubmissionFailed(
                SubmissionFault {
                    message: error.to_string(),
                    code: error.code().to_string(),
                },
            )));
        }
        actions.push(WidgetAction::Notify(Notification::Failed(error)));
        actions
    }

    /// Derive the fully parameterized frame URL for a (re)mount.
    fn frame_url(&self) -> Result<String, WidgetError> {
        build_frame_url(
            &self.config.form_url,
            &self.config.frame_config_json(),
            &self.instance_tag,
            self.env.unix_time_ms(),
        )
        .map(String::from)
        .map_err(|e| {
            let reason = match e {
                ProtocolError::InvalidFormUrl { reason } => reason,
                other => other.to_string(),
            };
            WidgetError::Config(ConfigError::InvalidFormUrl { reason })
        })
    }
}

/// Fault reason with the wire default substituted for absence.
fn fault_reason(fault: FormFault, default: &str) -> String {
    fault.message.unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    };
    use std::time::Instant;

    use packslip_core::config::FormOrigin;
    use serde_json::json;

    use super::*;

    const FORM_ORIGIN: &str = "https://forms.example.com";

    #[derive(Clone)]
    struct TestEnv {
        clock_ms: Arc<AtomicU64>,
        started: Instant,
    }

    impl TestEnv {
        fn new() -> Self {
            Self { clock_ms: Arc::new(AtomicU64::new(1_754_438_400_000)), started: Instant::now() }
        }

        fn advance_ms(&self, ms: u64) {
            self.clock_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Environment for TestEnv {
        fn now(&self) -> Instant {
            self.started
        }

        fn unix_time_ms(&self) -> u64 {
            self.clock_ms.load(Ordering::SeqCst)
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            std::future::ready(())
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            // Deterministic for tests
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = i as u8;
            }
        }

        fn user_agent(&self) -> String {
            "packslip-test/2.0.0".to_string()
        }
    }

    fn test_config() -> WidgetConfig {
        let mut config = WidgetConfig::new(
            "https://api.example.com/shipping",
            FormOrigin::Exact(FORM_ORIGIN.to_string()),
        )
        .unwrap();
        config.form_url = format!("{FORM_ORIGIN}/index.html");
        config
    }

    fn test_widget() -> Widget<TestEnv> {
        Widget::new(TestEnv::new(), test_config())
    }

    fn open_widget() -> Widget<TestEnv> {
        let mut widget = test_widget();
        widget.handle(WidgetEvent::Open).unwrap();
        widget.handle(WidgetEvent::FrameLoaded).unwrap();
        widget
    }

    fn form_message(widget: &Widget<TestEnv>, body: Value) -> WidgetEvent {
        let mut envelope = body;
        envelope["instance"] = json!(widget.instance_tag());
        WidgetEvent::MessageReceived {
            origin: FORM_ORIGIN.to_string(),
            payload: envelope.to_string(),
        }
    }

    fn resolved(status: u16, body: Value) -> WidgetEvent {
        WidgetEvent::SubmissionResolved {
            outcome: Ok(HttpReply { status, body: body.to_string() }),
        }
    }

    fn submit_event(widget: &Widget<TestEnv>) -> WidgetEvent {
        form_message(
            widget,
            json!({"type": "SHIPPING_FORM_SUBMIT", "data": {"name": "Ada", "city": "London"}}),
        )
    }

    fn has_post_success(actions: &[WidgetAction]) -> bool {
        actions
            .iter()
            .any(|a| matches!(a, WidgetAction::PostToForm(HostMessage::SubmissionSucceeded(_))))
    }

    #[test]
    fn open_mounts_surface_and_locks_scroll() {
        let mut widget = test_widget();
        let actions = widget.handle(WidgetEvent::Open).unwrap();

        assert!(widget.is_open());
        assert!(widget.is_loading());
        assert!(matches!(&actions[0], WidgetAction::MountSurface { .. }));
        assert!(actions.contains(&WidgetAction::SetScrollLock(true)));
    }

    #[test]
    fn frame_url_carries_config_and_instance() {
        let mut widget = test_widget();
        let actions = widget.handle(WidgetEvent::Open).unwrap();

        let WidgetAction::MountSurface { frame_url } = &actions[0] else {
            panic!("expected MountSurface first");
        };
        let url = url::Url::parse(frame_url).unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(pairs.get("sdk_version").map(String::as_str), Some(PROTOCOL_VERSION));
        assert_eq!(pairs.get("instance").map(String::as_str), Some(widget.instance_tag()));
        assert!(pairs.get("config").is_some_and(|c| c.contains("apiEndpoint")));
        assert_eq!(pairs.get("timestamp").map(String::as_str), Some("1754438400000"));
    }

    #[test]
    fn open_twice_warns_without_side_effects() {
        let mut widget = test_widget();
        widget.handle(WidgetEvent::Open).unwrap();

        let actions = widget.handle(WidgetEvent::Open).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], WidgetAction::Log { level: LogLevel::Warn, .. }));
        assert!(widget.is_open());
    }

    #[test]
    fn close_before_open_is_noop() {
        let mut widget = test_widget();
        assert!(widget.handle(WidgetEvent::Close).unwrap().is_empty());
    }

    #[test]
    fn close_unmounts_and_notifies() {
        let mut widget = open_widget();
        let actions = widget.handle(WidgetEvent::Close).unwrap();

        assert!(!widget.is_open());
        assert!(actions.contains(&WidgetAction::UnmountSurface));
        assert!(actions.contains(&WidgetAction::SetScrollLock(false)));
        assert!(actions.contains(&WidgetAction::Notify(Notification::Closed)));
    }

    #[test]
    fn escape_closes_once_then_nothing() {
        let mut widget = open_widget();

        let first = widget.handle(WidgetEvent::EscapePressed).unwrap();
        assert!(first.contains(&WidgetAction::UnmountSurface));
        assert!(!widget.is_open());

        let second = widget.handle(WidgetEvent::EscapePressed).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn backdrop_press_only_closes_on_backdrop() {
        let mut widget = open_widget();

        assert!(widget.handle(WidgetEvent::BackdropPressed { on_backdrop: false }).unwrap()
            .is_empty());
        assert!(widget.is_open());

        let actions = widget.handle(WidgetEvent::BackdropPressed { on_backdrop: true }).unwrap();
        assert!(actions.contains(&WidgetAction::UnmountSurface));
        assert!(!widget.is_open());
    }

    #[test]
    fn frame_loaded_ends_loading_and_notifies() {
        let mut widget = test_widget();
        widget.handle(WidgetEvent::Open).unwrap();
        assert!(widget.is_loading());

        let actions = widget.handle(WidgetEvent::FrameLoaded).unwrap();
        assert!(!widget.is_loading());
        assert!(actions.contains(&WidgetAction::Notify(Notification::Loaded)));

        // A stray duplicate load signal changes nothing.
        assert!(widget.handle(WidgetEvent::FrameLoaded).unwrap().is_empty());
    }

    #[test]
    fn frame_load_failure_surfaces_retry() {
        let mut widget = test_widget();
        widget.handle(WidgetEvent::Open).unwrap();

        let actions = widget.handle(WidgetEvent::FrameLoadFailed { reason: String::new() }).unwrap();
        assert!(!widget.is_loading());
        assert!(widget.is_open());
        assert!(actions.contains(&WidgetAction::ShowLoadRetry));
        assert!(actions.contains(&WidgetAction::Notify(Notification::Failed(
            WidgetError::Load { reason: "Failed to load shipping form".to_string() }
        ))));
    }

    #[test]
    fn retry_remounts_with_fresh_timestamp() {
        let mut widget = test_widget();
        widget.handle(WidgetEvent::Open).unwrap();
        widget.handle(WidgetEvent::FrameLoadFailed { reason: String::new() }).unwrap();

        widget.env.advance_ms(5_000);
        let actions = widget.handle(WidgetEvent::RetryLoad).unwrap();

        assert!(widget.is_loading());
        let WidgetAction::RemountSurface { frame_url } = &actions[0] else {
            panic!("expected RemountSurface first");
        };
        assert!(frame_url.contains("timestamp=1754438405000"));
    }

    #[test]
    fn ready_event_logs_only() {
        let mut widget = open_widget();
        let event = form_message(&widget, json!({"type": "SHIPPING_FORM_READY"}));
        let actions = widget.handle(event).unwrap();

        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], WidgetAction::Log { level: LogLevel::Info, .. }));
    }

    #[test]
    fn form_close_event_closes() {
        let mut widget = open_widget();
        let event = form_message(&widget, json!({"type": "SHIPPING_FORM_CLOSE"}));
        let actions = widget.handle(event).unwrap();

        assert!(!widget.is_open());
        assert!(actions.contains(&WidgetAction::UnmountSurface));
    }

    #[test]
    fn validation_error_defaults_reason() {
        let mut widget = open_widget();
        let event =
            form_message(&widget, json!({"type": "SHIPPING_FORM_VALIDATION_ERROR", "data": {}}));
        let actions = widget.handle(event).unwrap();

        assert_eq!(
            actions,
            vec![WidgetAction::Notify(Notification::Failed(WidgetError::Validation {
                reason: "Please check your inputs".to_string(),
            }))]
        );
        assert!(widget.is_open());
    }

    #[test]
    fn form_error_defaults_reason() {
        let mut widget = open_widget();
        let event = form_message(&widget, json!({"type": "SHIPPING_FORM_ERROR"}));
        let actions = widget.handle(event).unwrap();

        assert_eq!(
            actions,
            vec![WidgetAction::Notify(Notification::Failed(WidgetError::Form {
                reason: "Form error occurred".to_string(),
            }))]
        );
    }

    #[test]
    fn submit_prepares_request_and_notifies() {
        let mut widget = open_widget();
        let actions = widget.handle(submit_event(&widget)).unwrap();

        let WidgetAction::Notify(Notification::Submitted(form)) = &actions[0] else {
            panic!("expected Submitted notification first");
        };
        assert_eq!(form["name"], "Ada");

        let WidgetAction::BeginSubmission(prepared) = &actions[1] else {
            panic!("expected BeginSubmission second");
        };
        assert_eq!(prepared.endpoint, "https://api.example.com/shipping");

        let body: Value = serde_json::from_str(&prepared.body).unwrap();
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["metadata"]["sdk_version"], PROTOCOL_VERSION);
        assert_eq!(body["metadata"]["user_agent"], "packslip-test/2.0.0");
        assert_eq!(body["metadata"]["submitted_at"], "2025-08-06T00:00:00.000Z");
    }

    #[test]
    fn wrong_origin_is_dropped() {
        let mut widget = open_widget();
        let actions = widget
            .handle(WidgetEvent::MessageReceived {
                origin: "https://evil.example.com".to_string(),
                payload: json!({"type": "SHIPPING_FORM_CLOSE"}).to_string(),
            })
            .unwrap();

        assert!(widget.is_open());
        assert!(matches!(&actions[0], WidgetAction::Log { level: LogLevel::Warn, .. }));
    }

    #[test]
    fn wrong_instance_is_dropped() {
        let mut widget = open_widget();
        let actions = widget
            .handle(WidgetEvent::MessageReceived {
                origin: FORM_ORIGIN.to_string(),
                payload: json!({"type": "SHIPPING_FORM_CLOSE", "instance": "someone-else"})
                    .to_string(),
            })
            .unwrap();

        assert!(actions.is_empty());
        assert!(widget.is_open());
    }

    #[test]
    fn untagged_message_is_accepted() {
        let mut widget = open_widget();
        let actions = widget
            .handle(WidgetEvent::MessageReceived {
                origin: FORM_ORIGIN.to_string(),
                payload: json!({"type": "SHIPPING_FORM_CLOSE"}).to_string(),
            })
            .unwrap();

        assert!(!widget.is_open());
        assert!(actions.contains(&WidgetAction::UnmountSurface));
    }

    #[test]
    fn unknown_message_types_are_ignored() {
        let mut widget = open_widget();
        for payload in
            ["not json", "42", r#"{"other":"shape"}"#, r#"{"type":"SOME_FUTURE_EVENT"}"#]
        {
            let actions = widget
                .handle(WidgetEvent::MessageReceived {
                    origin: FORM_ORIGIN.to_string(),
                    payload: payload.to_string(),
                })
                .unwrap();
            assert!(actions.is_empty(), "payload {payload} produced actions");
        }
        assert!(widget.is_open());
    }

    #[test]
    fn submission_success_posts_ack_and_schedules_close() {
        let mut widget = open_widget();
        widget.handle(submit_event(&widget)).unwrap();

        let actions = widget
            .handle(resolved(
                200,
                json!({
                    "success": true,
                    "message": "created",
                    "data": {"tracking_number": "T1", "id": "S1"},
                }),
            ))
            .unwrap();

        let WidgetAction::PostToForm(HostMessage::SubmissionSucceeded(ack)) = &actions[0] else {
            panic!("expected success post first");
        };
        assert_eq!(ack.tracking_number.as_deref(), Some("T1"));
        assert_eq!(ack.shipment_id.as_deref(), Some("S1"));
        assert_eq!(ack.message.as_deref(), Some("created"));

        let WidgetAction::Notify(Notification::Succeeded(data)) = &actions[1] else {
            panic!("expected Succeeded notification second");
        };
        assert_eq!(data["tracking_number"], "T1");

        assert!(actions.contains(&WidgetAction::ScheduleClose { delay: AUTO_CLOSE_DELAY }));
        assert!(widget.is_open());
    }

    #[test]
    fn submission_success_without_data_passes_whole_body() {
        let mut widget = open_widget();
        let actions = widget.handle(resolved(200, json!({"success": true, "message": "ok"}))).unwrap();

        let succeeded = actions.iter().find_map(|a| match a {
            WidgetAction::Notify(Notification::Succeeded(v)) => Some(v),
            _ => None,
        });
        assert_eq!(succeeded.unwrap()["message"], "ok");
    }

    #[test]
    fn auto_close_disabled_does_not_schedule() {
        let mut widget = open_widget();
        widget
            .handle(WidgetEvent::UpdateConfig(ConfigPatch {
                auto_close: Some(false),
                ..ConfigPatch::default()
            }))
            .unwrap();

        let actions = widget.handle(resolved(200, json!({"success": true}))).unwrap();
        assert!(!actions.iter().any(|a| matches!(a, WidgetAction::ScheduleClose { .. })));
    }

    #[test]
    fn submission_status_failure_reports_response_message() {
        let mut widget = open_widget();
        let actions = widget.handle(resolved(422, json!({"message": "bad address"}))).unwrap();

        let WidgetAction::PostToForm(HostMessage::SubmissionFailed(fault)) = &actions[1] else {
            panic!("expected failure post");
        };
        assert_eq!(fault.message, "bad address");
        assert_eq!(fault.code, "SUBMISSION_FAILED");

        assert!(actions.contains(&WidgetAction::Notify(Notification::Failed(
            WidgetError::Submission { message: "bad address".to_string(), code: None }
        ))));
        assert!(widget.is_open());
        assert!(!actions.iter().any(|a| matches!(a, WidgetAction::ScheduleClose { .. })));
    }

    #[test]
    fn submission_failure_keeps_response_code() {
        let mut widget = open_widget();
        let actions = widget
            .handle(resolved(422, json!({"error": {"message": "bad address", "code": "ADDR"}})))
            .unwrap();

        let WidgetAction::PostToForm(HostMessage::SubmissionFailed(fault)) = &actions[1] else {
            panic!("expected failure post");
        };
        assert_eq!(fault.code, "ADDR");
    }

    #[test]
    fn submission_status_failure_falls_back_to_generic_message() {
        let mut widget = open_widget();
        let actions = widget.handle(resolved(500, json!({}))).unwrap();

        let WidgetAction::PostToForm(HostMessage::SubmissionFailed(fault)) = &actions[1] else {
            panic!("expected failure post");
        };
        assert_eq!(fault.message, "Submission failed with status 500");
    }

    #[test]
    fn explicit_false_success_is_invalid_format() {
        let mut widget = open_widget();
        let actions = widget.handle(resolved(200, json!({"success": false}))).unwrap();

        assert!(!has_post_success(&actions));
        assert!(actions.contains(&WidgetAction::Notify(Notification::Failed(
            WidgetError::Submission {
                message: "Invalid API response format: missing success flag".to_string(),
                code: None,
            }
        ))));
    }

    #[test]
    fn non_json_body_is_generic_failure() {
        let mut widget = open_widget();
        let actions = widget
            .handle(WidgetEvent::SubmissionResolved {
                outcome: Ok(HttpReply { status: 200, body: "<html>oops</html>".to_string() }),
            })
            .unwrap();

        assert!(actions.contains(&WidgetAction::Notify(Notification::Failed(
            WidgetError::Submission {
                message: "Invalid JSON in API response".to_string(),
                code: None,
            }
        ))));
    }

    #[test]
    fn network_failure_is_reported() {
        let mut widget = open_widget();
        let actions = widget
            .handle(WidgetEvent::SubmissionResolved {
                outcome: Err(TransportError::Network { reason: "connection refused".to_string() }),
            })
            .unwrap();

        let WidgetAction::PostToForm(HostMessage::SubmissionFailed(fault)) = &actions[1] else {
            panic!("expected failure post");
        };
        assert_eq!(fault.message, "network error: connection refused");
        assert!(widget.is_open());
    }

    #[test]
    fn close_mid_submission_suppresses_frame_post() {
        let mut widget = open_widget();
        widget.handle(submit_event(&widget)).unwrap();
        widget.handle(WidgetEvent::Close).unwrap();

        let actions = widget
            .handle(resolved(200, json!({"success": true, "data": {"id": "S1"}})))
            .unwrap();

        assert!(!has_post_success(&actions));
        assert!(
            actions
                .iter()
                .any(|a| matches!(a, WidgetAction::Notify(Notification::Succeeded(_))))
        );
    }

    #[test]
    fn destroy_closes_and_goes_terminal() {
        let mut widget = open_widget();
        let actions = widget.handle(WidgetEvent::Destroy).unwrap();

        assert!(actions.contains(&WidgetAction::UnmountSurface));
        assert!(actions.contains(&WidgetAction::Notify(Notification::Closed)));
        assert!(widget.is_destroyed());
        assert!(!widget.is_open());

        // Idempotent.
        assert!(widget.handle(WidgetEvent::Destroy).unwrap().is_empty());
    }

    #[test]
    fn destroyed_widget_ignores_everything() {
        let mut widget = open_widget();
        let close_message = form_message(&widget, json!({"type": "SHIPPING_FORM_CLOSE"}));
        widget.handle(WidgetEvent::Destroy).unwrap();

        assert!(widget.handle(WidgetEvent::Open).unwrap().is_empty());
        assert!(widget.handle(close_message).unwrap().is_empty());
        assert!(widget.handle(resolved(200, json!({"success": true}))).unwrap().is_empty());
    }

    #[test]
    fn update_config_rejects_empty_endpoint() {
        let mut widget = test_widget();
        let result = widget.handle(WidgetEvent::UpdateConfig(ConfigPatch {
            api_endpoint: Some(String::new()),
            ..ConfigPatch::default()
        }));

        assert_eq!(
            result,
            Err(WidgetError::Config(packslip_core::ConfigError::MissingEndpoint))
        );
        assert_eq!(widget.config().api_endpoint, "https://api.example.com/shipping");
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum LifecycleOp {
            Open,
            Close,
            Escape,
            Backdrop(bool),
        }

        fn lifecycle_op() -> impl Strategy<Value = LifecycleOp> {
            prop_oneof![
                Just(LifecycleOp::Open),
                Just(LifecycleOp::Close),
                Just(LifecycleOp::Escape),
                any::<bool>().prop_map(LifecycleOp::Backdrop),
            ]
        }

        proptest! {
            /// `is_open` exactly reflects whether a close most recently
            /// followed an open, for every lifecycle sequence.
            #[test]
            fn open_state_never_desyncs(ops in proptest::collection::vec(lifecycle_op(), 0..64)) {
                let mut widget = test_widget();
                let mut model_open = false;

                for op in ops {
                    match op {
                        LifecycleOp::Open => {
                            widget.handle(WidgetEvent::Open).unwrap();
                            model_open = true;
                        },
                        LifecycleOp::Close => {
                            widget.handle(WidgetEvent::Close).unwrap();
                            model_open = false;
                        },
                        LifecycleOp::Escape => {
                            widget.handle(WidgetEvent::EscapePressed).unwrap();
                            model_open = false;
                        },
                        LifecycleOp::Backdrop(on_backdrop) => {
                            widget.handle(WidgetEvent::BackdropPressed { on_backdrop }).unwrap();
                            if on_backdrop {
                                model_open = false;
                            }
                        },
                    }
                    prop_assert_eq!(widget.is_open(), model_open);
                }
            }
        }
    }
}
