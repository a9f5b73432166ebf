//! Modal session state.
//!
//! One mutable record per widget instance. Transitions happen only through
//! the lifecycle half of the state machine; the protocol half observes but
//! never mutates.

/// Modal lifecycle phase.
///
/// `Closed → Opening → Open → Closed`. Opening covers the window between
/// mounting the frame and its load-complete signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No surface mounted.
    #[default]
    Closed,

    /// Surface mounted, embedded content still loading.
    Opening,

    /// Surface mounted, embedded content settled (loaded or load-failed
    /// with the retry affordance showing).
    Open,
}

/// Session state for one widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    phase: Phase,
}

impl SessionState {
    /// A closed session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a surface is mounted (Opening or Open).
    pub fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    /// Whether the embedded content is still loading.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Opening
    }

    /// Transition to a new phase.
    pub fn set(&mut self, phase: Phase) {
        self.phase = phase;
    }
}
