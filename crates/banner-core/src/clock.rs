//! Injectable time source for the rate limiter and debouncer.
//!
//! [`TokioClock`] reads tokio's time driver, so tests running under
//! `#[tokio::test(start_paused = true)]` advance it deterministically.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// A source of "now" plus the ability to suspend until later.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
