//! Fuzz target for the [`Widget`] state machine
//!
//! Prevent lifecycle desync and post-teardown frame access via arbitrary
//! event sequences
//!
//! # Strategy
//!
//! - Event sequences: arbitrary interleavings of lifecycle commands,
//!   dismissal triggers, channel messages, and transport completions
//! - Hostile channel traffic: malformed JSON, unknown tags, wrong
//!   instance tags, wrong origins
//! - Hostile replies: arbitrary statuses and bodies, including non-JSON
//!
//! # Invariants
//!
//! - NEVER panic on any event in any state
//! - Destroyed is terminal: every later event returns zero actions
//! - `PostToForm` only ever emitted while a surface is mounted
//! - Open/close commands always land the session in the commanded state
//! - Close when closed produces zero actions

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use packslip_core::{Environment, FormOrigin, HttpReply, TransportError, WidgetConfig};
use packslip_widget::{Widget, WidgetAction, WidgetEvent};

const FORM_ORIGIN: &str = "https://forms.example.com";

/// Deterministic environment seeded from the fuzz input.
#[derive(Clone)]
struct FuzzEnv {
    base: Instant,
    epoch_ms: u64,
    seed: u8,
}

impl Environment for FuzzEnv {
    fn now(&self) -> Instant {
        self.base
    }

    fn unix_time_ms(&self) -> u64 {
        self.epoch_ms
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = self.seed.wrapping_add(i as u8);
        }
    }

    fn user_agent(&self) -> String {
        "packslip-fuzz".to_string()
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzMessage {
    Ready,
    Close,
    Submit { tagged: bool },
    ValidationError { with_message: bool },
    FormError,
    UnknownTag { tag_seed: u8 },
    RawBytes(Vec<u8>),
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzOp {
    Open,
    Close,
    Escape,
    Backdrop { on_backdrop: bool },
    Destroy,
    FrameLoaded,
    FrameLoadFailed { reason_len: u8 },
    RetryLoad,
    Message { trusted_origin: bool, message: FuzzMessage },
    Resolve { status: u16, body: Vec<u8> },
    NetworkFailure { reason_len: u8 },
}

/// Fuzz input with a deterministic seed for instance-tag generation.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Seed for the environment's RNG and clock.
    seed: u8,
    /// Initial wall-clock time in seconds.
    initial_time_secs: u32,
    /// Event sequence to process.
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: FuzzInput| {
    let env = FuzzEnv {
        base: Instant::now(),
        epoch_ms: u64::from(input.initial_time_secs) * 1000,
        seed: input.seed,
    };

    let Ok(mut config) =
        WidgetConfig::new("https://api.example.com/shipping", FormOrigin::Exact(FORM_ORIGIN.into()))
    else {
        return;
    };
    config.form_url = format!("{FORM_ORIGIN}/index.html");

    let mut widget = Widget::new(env, config);
    let tag = widget.instance_tag().to_string();

    for op in input.ops {
        let was_open = widget.is_open();
        let was_destroyed = widget.is_destroyed();
        let event = build_event(&tag, op);

        let actions = match widget.handle(event) {
            Ok(actions) => actions,
            // Rejected events must leave no trace and no torn state.
            Err(_) => {
                assert_eq!(widget.is_open(), was_open);
                continue;
            },
        };

        if was_destroyed {
            assert!(actions.is_empty(), "destroyed widget produced actions");
            assert!(!widget.is_open());
        }

        for action in &actions {
            if matches!(action, WidgetAction::PostToForm(_)) {
                assert!(was_open, "frame post without a mounted surface");
            }
        }

        if widget.is_destroyed() {
            assert!(!widget.is_open(), "destroyed widget left open");
        }
    }

    // Destroyed stays terminal under further traffic.
    let _ = widget.handle(WidgetEvent::Destroy);
    assert!(widget.is_destroyed());
    let after = widget.handle(WidgetEvent::Open).unwrap_or_default();
    assert!(after.is_empty());
    assert!(!widget.is_open());
});

fn build_event(tag: &str, op: FuzzOp) -> WidgetEvent {
    match op {
        FuzzOp::Open => WidgetEvent::Open,
        FuzzOp::Close => WidgetEvent::Close,
        FuzzOp::Escape => WidgetEvent::EscapePressed,
        FuzzOp::Backdrop { on_backdrop } => WidgetEvent::BackdropPressed { on_backdrop },
        FuzzOp::Destroy => WidgetEvent::Destroy,
        FuzzOp::FrameLoaded => WidgetEvent::FrameLoaded,
        FuzzOp::FrameLoadFailed { reason_len } => WidgetEvent::FrameLoadFailed {
            reason: "x".repeat((reason_len % 64) as usize),
        },
        FuzzOp::RetryLoad => WidgetEvent::RetryLoad,
        FuzzOp::Message { trusted_origin, message } => WidgetEvent::MessageReceived {
            origin: if trusted_origin {
                FORM_ORIGIN.to_string()
            } else {
                "https://elsewhere.example.com".to_string()
            },
            payload: build_payload(tag, message),
        },
        FuzzOp::Resolve { status, body } => WidgetEvent::SubmissionResolved {
            outcome: Ok(HttpReply {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
        },
        FuzzOp::NetworkFailure { reason_len } => WidgetEvent::SubmissionResolved {
            outcome: Err(TransportError::Network {
                reason: "e".repeat((reason_len % 32) as usize),
            }),
        },
    }
}

fn build_payload(tag: &str, message: FuzzMessage) -> String {
    match message {
        FuzzMessage::Ready => serde_json::json!({"type": "SHIPPING_FORM_READY"}).to_string(),
        FuzzMessage::Close => {
            serde_json::json!({"type": "SHIPPING_FORM_CLOSE", "instance": tag}).to_string()
        },
        FuzzMessage::Submit { tagged } => {
            let mut payload = serde_json::json!({
                "type": "SHIPPING_FORM_SUBMIT",
                "data": {"name": "fuzz"},
            });
            if tagged {
                payload["instance"] = serde_json::json!(tag);
            }
            payload.to_string()
        },
        FuzzMessage::ValidationError { with_message } => {
            let data = if with_message {
                serde_json::json!({"message": "fuzzed"})
            } else {
                serde_json::json!({})
            };
            serde_json::json!({"type": "SHIPPING_FORM_VALIDATION_ERROR", "data": data}).to_string()
        },
        FuzzMessage::FormError => serde_json::json!({"type": "SHIPPING_FORM_ERROR"}).to_string(),
        FuzzMessage::UnknownTag { tag_seed } => {
            serde_json::json!({"type": format!("FUZZ_EVENT_{tag_seed}")}).to_string()
        },
        FuzzMessage::RawBytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}
