//! Simulated environment with a virtual clock and seeded RNG.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use std::time::{Duration, Instant};

use packslip_core::env::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Virtual epoch the simulated wall clock starts at (2025-08-06T00:00:00Z).
const SIM_EPOCH_MS: u64 = 1_754_438_400_000;

/// Deterministic environment for simulations.
///
/// - Time is virtual: it advances only through [`SimEnv::advance`] or
///   `sleep`, which completes instantly after moving the clock. A test
///   that sleeps through the auto-close delay observes it with zero
///   wall-clock cost.
/// - Randomness is a seeded ChaCha stream: the same seed reproduces the
///   same instance tags and the same execution.
#[derive(Clone)]
pub struct SimEnv {
    inner: Arc<SimEnvInner>,
}

struct SimEnvInner {
    /// Monotonic anchor captured at construction.
    base: Instant,
    /// Virtual milliseconds elapsed since construction.
    elapsed_ms: AtomicU64,
    /// Seeded RNG stream.
    rng: Mutex<ChaCha8Rng>,
}

impl SimEnv {
    /// Create a simulated environment from a seed.
    ///
    /// The seed MUST be logged by tests that generate it randomly, so a
    /// failure replays exactly.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Arc::new(SimEnvInner {
                base: Instant::now(),
                elapsed_ms: AtomicU64::new(0),
                rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            }),
        }
    }

    /// Advance the virtual clock.
    pub fn advance(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.inner.elapsed_ms.fetch_add(millis, Ordering::SeqCst);
    }

    /// Virtual milliseconds elapsed since construction.
    pub fn elapsed_ms(&self) -> u64 {
        self.inner.elapsed_ms.load(Ordering::SeqCst)
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.inner.base + Duration::from_millis(self.elapsed_ms())
    }

    fn unix_time_ms(&self) -> u64 {
        SIM_EPOCH_MS + self.elapsed_ms()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.inner.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }

    fn user_agent(&self) -> String {
        "packslip-harness/sim".to_string()
    }
}
