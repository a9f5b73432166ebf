//! Recording embedder for simulations.

use std::sync::{Arc, Mutex, PoisonError};

use packslip_host::{Embedder, SurfaceRequest};

/// Observable surface state recorded by [`SimEmbedder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceState {
    /// Frame URL of the mounted surface, if any.
    pub mounted: Option<String>,

    /// Whether background scroll is suppressed.
    pub scroll_locked: bool,

    /// Whether the load-retry affordance is showing.
    pub retry_visible: bool,

    /// Messages posted into the frame: `(payload, target_origin)`.
    pub posts: Vec<(String, String)>,

    /// Total mounts (including remounts).
    pub mount_count: u32,

    /// Total unmounts.
    pub unmount_count: u32,
}

/// Embedder that records every surface operation instead of touching a
/// real page.
///
/// Posts are recorded even without a mounted surface so tests can assert
/// the widget's frame-presence guard rather than rely on the embedder to
/// drop them.
#[derive(Clone, Default)]
pub struct SimEmbedder {
    state: Arc<Mutex<SurfaceState>>,
}

impl SimEmbedder {
    /// A fresh embedder with no surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded surface state.
    pub fn state(&self) -> SurfaceState {
        self.lock().clone()
    }

    /// Messages posted into the frame so far.
    pub fn posts(&self) -> Vec<(String, String)> {
        self.lock().posts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Embedder for SimEmbedder {
    fn mount_surface(&self, surface: &SurfaceRequest) {
        let mut state = self.lock();
        state.mounted = Some(surface.frame_url.clone());
        state.retry_visible = false;
        state.mount_count += 1;
    }

    fn unmount_surface(&self) {
        let mut state = self.lock();
        state.mounted = None;
        state.retry_visible = false;
        state.unmount_count += 1;
    }

    fn set_scroll_lock(&self, locked: bool) {
        self.lock().scroll_locked = locked;
    }

    fn show_load_retry(&self) {
        self.lock().retry_visible = true;
    }

    fn post_to_form(&self, payload: &str, target_origin: &str) {
        self.lock().posts.push((payload.to_string(), target_origin.to_string()));
    }
}
