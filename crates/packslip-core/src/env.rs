//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples widget logic from host resources
//! (time, randomness, the client identity string). This enables:
//!
//! - Deterministic simulation: the harness provides a virtual clock and a
//!   seeded RNG, so every lifecycle and submission scenario replays
//!   exactly.
//!
//! - Production runtime: the host crate's implementation uses real system
//!   resources without any change to widget logic.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: implementations must not share global state

use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat};

/// Abstract environment providing time, randomness, and async primitives.
///
/// Widget logic only ever observes the host through this trait, which is
/// what keeps the state machine deterministic and testable.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current monotonic time.
    ///
    /// # Invariants
    ///
    /// - Monotonicity: subsequent calls must return times >= previous
    ///   calls within a single execution context.
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time as milliseconds since the Unix
    /// epoch.
    ///
    /// Used for the frame URL load timestamp and submission metadata.
    /// Simulations report virtual time here.
    fn unix_time_ms(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be
    /// used by driver code (not widget logic). The auto-close delay runs
    /// through it.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Determinism during simulations: given the same RNG seed, this
    ///   produces the same sequence of bytes
    /// - Production implementations use OS entropy
    fn random_bytes(&self, buffer: &mut [u8]);

    /// The client identity string attached to submission metadata.
    fn user_agent(&self) -> String;

    /// Generates a random `u64`.
    ///
    /// Convenience for instance correlation tags.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Current wall-clock time formatted as ISO-8601 UTC with millisecond
    /// precision (`2026-08-06T12:00:00.000Z`).
    fn timestamp_iso8601(&self) -> String {
        DateTime::from_timestamp_millis(i64::try_from(self.unix_time_ms()).unwrap_or(i64::MAX))
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default()
    }
}
