//! Embedding surface seam.
//!
//! Overlay and frame construction is an external collaborator: the
//! integrator supplies an [`Embedder`] for whatever surface technology the
//! host page uses, and the driver drives it purely through this trait.
//! The driver guarantees mount/unmount calls are balanced and that posts
//! only happen while a surface is mounted.

use packslip_proto::{FRAME_SANDBOX_ALLOW, FRAME_TITLE};

/// Everything an embedder needs to mount the modal surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRequest {
    /// Fully parameterized frame URL; the hosted form self-configures
    /// from its query string.
    pub frame_url: String,

    /// Sandbox grants the embedder must apply to the frame, verbatim.
    /// The isolation boundary holds regardless of what the hosted form
    /// requests.
    pub sandbox: &'static [&'static str],

    /// Accessible title for the frame.
    pub title: &'static str,
}

impl SurfaceRequest {
    /// Build a surface request for a frame URL.
    pub fn new(frame_url: String) -> Self {
        Self { frame_url, sandbox: FRAME_SANDBOX_ALLOW, title: FRAME_TITLE }
    }
}

/// The surface the driver renders into.
///
/// Implementations own the overlay, the embedded frame, scroll
/// suppression, and the frame messaging channel. They report user input
/// and frame signals back to the driver as [`WidgetEvent`]s
/// (`FrameLoaded`, `FrameLoadFailed`, `BackdropPressed`, `EscapePressed`,
/// `RetryLoad`, `MessageReceived`).
///
/// [`WidgetEvent`]: packslip_widget::WidgetEvent
pub trait Embedder: Send + Sync + 'static {
    /// Mount the overlay and embedded frame.
    fn mount_surface(&self, surface: &SurfaceRequest);

    /// Replace the embedded frame after a load retry.
    ///
    /// Defaults to a plain mount; embedders that keep the overlay alive
    /// across retries override this.
    fn remount_surface(&self, surface: &SurfaceRequest) {
        self.mount_surface(surface);
    }

    /// Tear down the overlay and frame.
    fn unmount_surface(&self);

    /// Suppress (true) or restore (false) background scrolling.
    fn set_scroll_lock(&self, locked: bool);

    /// Surface the load-failure retry affordance.
    fn show_load_retry(&self);

    /// Deliver an encoded message into the embedded frame, restricted to
    /// `target_origin` (`"*"` only under an explicit
    /// [`FormOrigin::Any`](packslip_core::FormOrigin::Any) policy).
    fn post_to_form(&self, payload: &str, target_origin: &str);
}
