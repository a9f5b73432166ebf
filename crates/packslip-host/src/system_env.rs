//! Production Environment implementation using system time and RNG.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use packslip_core::env::Environment;
use packslip_proto::PROTOCOL_VERSION;

/// Production environment using system time and cryptographic RNG.
///
/// This implementation:
/// - Uses `std::time::Instant::now()` for monotonic time
/// - Uses `std::time::SystemTime` for wall-clock timestamps
/// - Uses `tokio::time::sleep()` for async sleeping
/// - Uses `getrandom` for cryptographic randomness
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }

    fn unix_time_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).unwrap_or_else(|e| {
            // NOTE: This should never fail on supported platforms, if it
            // does it's a critical error. Fill with zeros as a fallback
            // (not secure, but prevents panic); instance tags degrade to a
            // shared value rather than crashing the host page.
            tracing::error!("getrandom failed: {}", e);
            buffer.fill(0);
        });
    }

    fn user_agent(&self) -> String {
        format!("packslip/{PROTOCOL_VERSION} ({})", std::env::consts::OS)
    }
}
