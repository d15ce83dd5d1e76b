//! Fixed inter-request delay.
//!
//! The archiver is strictly sequential, so a single uniform pause after each
//! request is enough to keep the request rate polite. Page fetches and asset
//! downloads share the same [`Throttle`].

use std::time::Duration;

use tracing::trace;

/// Uniform delay applied after every page fetch and every asset download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    /// Creates a throttle that sleeps for `delay` on every [`pause`](Self::pause).
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a throttle that never sleeps.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether a positive delay is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.delay.is_zero()
    }

    /// Sleeps for the configured delay; returns immediately when disabled.
    pub async fn pause(&self) {
        if self.is_enabled() {
            trace!(delay_ms = self.delay.as_millis(), "throttling");
            tokio::time::sleep(self.delay).await;
        }
    }
}
