//! Scripted submission transport for simulations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use packslip_core::transport::{HttpReply, SubmissionTransport, TransportError};
use packslip_proto::PreparedSubmission;

/// One scripted transport outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// The request reaches the API and produces this reply.
    Reply {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The request never produces a response.
    NetworkFailure {
        /// Failure description.
        reason: String,
    },
}

/// Transport that replays scripted outcomes and records every request.
///
/// Outcomes are consumed in FIFO order; an unscripted request fails with
/// a network error so a test can never silently hit the real network.
#[derive(Clone, Default)]
pub struct SimTransport {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    outcomes: VecDeque<ScriptedOutcome>,
    requests: Vec<PreparedSubmission>,
}

impl SimTransport {
    /// A transport with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a reply for the next request.
    pub fn enqueue_reply(&self, status: u16, body: impl Into<String>) {
        self.lock().outcomes.push_back(ScriptedOutcome::Reply { status, body: body.into() });
    }

    /// Script a network failure for the next request.
    pub fn enqueue_failure(&self, reason: impl Into<String>) {
        self.lock()
            .outcomes
            .push_back(ScriptedOutcome::NetworkFailure { reason: reason.into() });
    }

    /// Every request submitted so far, in order.
    pub fn requests(&self) -> Vec<PreparedSubmission> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SubmissionTransport for SimTransport {
    async fn submit(&self, request: &PreparedSubmission) -> Result<HttpReply, TransportError> {
        let outcome = {
            let mut script = self.lock();
            script.requests.push(request.clone());
            script.outcomes.pop_front()
        };

        match outcome {
            Some(ScriptedOutcome::Reply { status, body }) => Ok(HttpReply { status, body }),
            Some(ScriptedOutcome::NetworkFailure { reason }) => {
                Err(TransportError::Network { reason })
            },
            None => Err(TransportError::Network { reason: "unscripted request".to_string() }),
        }
    }
}
