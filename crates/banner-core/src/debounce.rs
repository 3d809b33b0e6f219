//! Per-key coalescing of bursty events.

use crate::clock::Clock;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Delivers only the last call per key within a quiet window.
///
/// Every call waits out the window; a call that was superseded by a newer
/// one for the same key in the meantime returns `None` without running its
/// action.
pub struct Debouncer<K> {
    clock: Arc<dyn Clock>,
    window: Duration,
    state: Mutex<DebounceState<K>>,
}

struct DebounceState<K> {
    latest: HashMap<K, u64>,
    counter: u64,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new(clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            clock,
            window,
            state: Mutex::new(DebounceState {
                latest: HashMap::new(),
                counter: 0,
            }),
        }
    }

    /// Wait out the quiet window, then run `action` if no newer call for
    /// `key` arrived.
    pub async fn debounce<F, Fut, T>(&self, key: K, action: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.counter += 1;
            let ticket = state.counter;
            state.latest.insert(key.clone(), ticket);
            ticket
        };

        self.clock.sleep(self.window).await;

        let is_latest = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.latest.get(&key) == Some(&ticket) {
                state.latest.remove(&key);
                true
            } else {
                false
            }
        };

        if is_latest {
            Some(action().await)
        } else {
            debug!("Debounced event for {:?} superseded", key);
            None
        }
    }
}
