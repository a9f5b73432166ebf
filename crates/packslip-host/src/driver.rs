//! Sans-IO orchestrator.
//!
//! The driver serializes every event through the widget mutex, executes
//! the returned actions, and owns the two spawned tasks: the HTTP
//! submission and the auto-close delay. Errors never escape event
//! dispatch; they are routed to the error callback or logged.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use packslip_core::{env::Environment, transport::SubmissionTransport};
use packslip_proto::PreparedSubmission;
use packslip_widget::{
    ConfigPatch, LogLevel, Widget, WidgetAction, WidgetConfig, WidgetEvent,
};
use tokio::sync::Mutex;

use crate::{
    callbacks::HostCallbacks,
    embedder::{Embedder, SurfaceRequest},
};

/// Production driver for one widget instance.
///
/// Wraps the widget state machine with a transport, an embedding surface,
/// and the merchant callback registry. Cheap to clone; all clones share
/// the same widget.
pub struct HostDriver<E, T, M>
where
    E: Environment,
    T: SubmissionTransport,
    M: Embedder,
{
    /// The state machine, serialized behind a mutex.
    widget: Arc<Mutex<Widget<E>>>,
    /// HTTP submission transport.
    transport: Arc<T>,
    /// The embedding surface.
    embedder: Arc<M>,
    /// Merchant callbacks.
    callbacks: Arc<HostCallbacks>,
    /// Environment (latency measurement, auto-close sleep).
    env: E,
    /// Set by destroy: the listener wiring is detached and embedder
    /// events stop entering the widget.
    detached: Arc<AtomicBool>,
}

impl<E, T, M> Clone for HostDriver<E, T, M>
where
    E: Environment,
    T: SubmissionTransport,
    M: Embedder,
{
    fn clone(&self) -> Self {
        Self {
            widget: Arc::clone(&self.widget),
            transport: Arc::clone(&self.transport),
            embedder: Arc::clone(&self.embedder),
            callbacks: Arc::clone(&self.callbacks),
            env: self.env.clone(),
            detached: Arc::clone(&self.detached),
        }
    }
}

impl<E, T, M> HostDriver<E, T, M>
where
    E: Environment,
    T: SubmissionTransport,
    M: Embedder,
{
    /// Create a driver around a validated configuration.
    pub fn new(
        env: E,
        config: WidgetConfig,
        transport: T,
        embedder: M,
        callbacks: HostCallbacks,
    ) -> Self {
        if config.api_key.is_empty() {
            tracing::warn!("apiKey is recommended for secure API communication");
        }

        Self {
            widget: Arc::new(Mutex::new(Widget::new(env.clone(), config))),
            transport: Arc::new(transport),
            embedder: Arc::new(embedder),
            callbacks: Arc::new(callbacks),
            env,
            detached: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open the modal.
    pub async fn open(&self) {
        self.process(WidgetEvent::Open).await;
    }

    /// Close the modal.
    pub async fn close(&self) {
        self.process(WidgetEvent::Close).await;
    }

    /// Merge a partial configuration into the live widget.
    pub async fn update_config(&self, patch: ConfigPatch) {
        self.process(WidgetEvent::UpdateConfig(patch)).await;
    }

    /// Release the widget: detach the listener wiring and force a close.
    /// Idempotent.
    pub async fn destroy(&self) {
        self.process(WidgetEvent::Destroy).await;
        self.detached.store(true, Ordering::SeqCst);
    }

    /// Feed an embedder signal or channel payload into the widget.
    ///
    /// No-op after destroy: the wiring is detached, so nothing fires and
    /// nothing errors.
    pub async fn dispatch(&self, event: WidgetEvent) {
        if self.detached.load(Ordering::SeqCst) {
            return;
        }
        self.process(event).await;
    }

    /// Whether a surface is currently mounted.
    pub async fn is_open(&self) -> bool {
        self.widget.lock().await.is_open()
    }

    /// Whether the embedded content is still loading.
    pub async fn is_loading(&self) -> bool {
        self.widget.lock().await.is_loading()
    }

    /// Run one event through the state machine and execute its actions.
    ///
    /// Returns a boxed future: `execute` spawns tasks that call back into
    /// `process`, so an explicit `Send` boxed return type is required to
    /// break the recursive `async fn` auto-trait inference cycle.
    fn process(
        &self,
        event: WidgetEvent,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let result = {
                let mut widget = self.widget.lock().await;
                widget.handle(event)
            };

            match result {
                Ok(actions) => self.execute(actions).await,
                Err(error) => {
                    tracing::warn!(%error, "widget event rejected");
                    self.callbacks.failed(&error);
                },
            }
        })
    }

    /// Execute widget actions.
    async fn execute(&self, actions: Vec<WidgetAction>) {
        for action in actions {
            match action {
                WidgetAction::MountSurface { frame_url } => {
                    self.embedder.mount_surface(&SurfaceRequest::new(frame_url));
                },

                WidgetAction::RemountSurface { frame_url } => {
                    self.embedder.remount_surface(&SurfaceRequest::new(frame_url));
                },

                WidgetAction::UnmountSurface => self.embedder.unmount_surface(),

                WidgetAction::SetScrollLock(locked) => self.embedder.set_scroll_lock(locked),

                WidgetAction::ShowLoadRetry => self.embedder.show_load_retry(),

                WidgetAction::PostToForm(message) => {
                    let target = {
                        let widget = self.widget.lock().await;
                        widget.config().form_origin.post_target().to_string()
                    };
                    match message.encode() {
                        Ok(payload) => self.embedder.post_to_form(&payload, &target),
                        Err(error) => {
                            tracing::error!(%error, "failed to encode frame message");
                        },
                    }
                },

                WidgetAction::BeginSubmission(prepared) => {
                    let driver = self.clone();
                    tokio::spawn(async move {
                        driver.run_submission(prepared).await;
                    });
                },

                WidgetAction::ScheduleClose { delay } => {
                    let driver = self.clone();
                    tokio::spawn(async move {
                        driver.env.sleep(delay).await;
                        // Harmless no-op when the user already closed.
                        driver.process(WidgetEvent::Close).await;
                    });
                },

                WidgetAction::Notify(notification) => self.callbacks.dispatch(&notification),

                WidgetAction::Log { level, message } => match level {
                    LogLevel::Debug => tracing::debug!("{}", message),
                    LogLevel::Info => tracing::info!("{}", message),
                    LogLevel::Warn => tracing::warn!("{}", message),
                    LogLevel::Error => tracing::error!("{}", message),
                },
            }
        }
    }

    /// Perform one submission attempt and feed the outcome back.
    async fn run_submission(&self, prepared: PreparedSubmission) {
        let started = self.env.now();
        let outcome = self.transport.submit(&prepared).await;
        let elapsed = self.env.now().saturating_duration_since(started);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(elapsed_ms, "submission transport finished");

        self.process(WidgetEvent::SubmissionResolved { outcome }).await;
    }
}
