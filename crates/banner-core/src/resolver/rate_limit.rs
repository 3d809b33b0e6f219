//! Process-wide spacing of outbound provider searches.

use crate::clock::Clock;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum interval between remote searches.
///
/// Each caller reserves the next free slot before suspending, so concurrent
/// callers are paced one interval apart instead of all waking together.
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>, min_interval: Duration) -> Self {
        Self {
            clock,
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&self) {
        let wait = {
            let mut next_slot = self.next_slot.lock().unwrap_or_else(|e| e.into_inner());
            let now = self.clock.now();
            let slot = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(slot + self.min_interval);
            slot - now
        };

        if !wait.is_zero() {
            debug!("Rate limiter delaying search by {:?}", wait);
            self.clock.sleep(wait).await;
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Arc::new(TokioClock), Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = limiter();
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_acquires_wait_remaining_interval() {
        let limiter = limiter();
        let start = Instant::now();
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        limiter.acquire().await;
        assert_eq!(Instant::now() - start, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_elapsed() {
        let limiter = limiter();
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(Instant::now() - before, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_paced() {
        let limiter = Arc::new(limiter());
        let start = Instant::now();

        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut finished = Vec::new();
        for task in tasks {
            finished.push(task.await.unwrap() - start);
        }
        finished.sort();
        assert_eq!(
            finished,
            vec![Duration::ZERO, Duration::from_secs(1), Duration::from_secs(2)]
        );
    }
}
