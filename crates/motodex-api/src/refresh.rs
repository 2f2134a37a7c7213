//! Single-flight token refresh.
//!
//! Every logical request records the refresh generation before it dispatches.
//! When it later sees a 401 it enters the latch: if the generation has moved,
//! another request finished a refresh in the meantime and its outcome is
//! reused; otherwise this request performs the refresh. Concurrent 401s
//! therefore share one call to the refresh endpoint.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct LatchState {
    generation: u64,
    last_ok: bool,
}

/// Result of passing through the latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This request refreshed the token successfully.
    Refreshed,
    /// Another request refreshed successfully after this one dispatched.
    Joined,
    /// The refresh (ours or a concurrent one) failed.
    Failed,
}

impl RefreshOutcome {
    /// Whether the original request should be replayed.
    #[must_use]
    pub const fn should_replay(self) -> bool {
        matches!(self, Self::Refreshed | Self::Joined)
    }
}

/// Serializes token refreshes across concurrent requests.
#[derive(Debug, Default)]
pub struct RefreshLatch {
    state: Mutex<LatchState>,
    generation: AtomicU64,
}

impl RefreshLatch {
    /// Creates an idle latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation to record before dispatching a request.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Runs `refresh` unless a refresh completed since `observed`.
    ///
    /// `refresh` returns whether it succeeded; it runs with the latch held so
    /// no other request can start a second refresh meanwhile.
    pub async fn refresh<F, Fut>(&self, observed: u64, refresh: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut state = self.state.lock().await;

        if state.generation != observed {
            debug!(
                observed,
                current = state.generation,
                "Joining refresh completed by a concurrent request"
            );
            return if state.last_ok {
                RefreshOutcome::Joined
            } else {
                RefreshOutcome::Failed
            };
        }

        let ok = refresh().await;
        state.generation += 1;
        state.last_ok = ok;
        self.generation.store(state.generation, Ordering::Release);
        drop(state);

        if ok {
            RefreshOutcome::Refreshed
        } else {
            RefreshOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_refresh_runs_once_for_same_generation() {
        let latch = Arc::new(RefreshLatch::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let observed = latch.generation();

        let mut handles = Vec::new();
        for _ in 0..5 {
            let latch = Arc::clone(&latch);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                latch
                    .refresh(observed, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        true
                    })
                    .await
            }));
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap_or(RefreshOutcome::Failed));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == RefreshOutcome::Refreshed)
                .count(),
            1
        );
        assert!(outcomes.iter().all(|o| o.should_replay()));
    }

    #[tokio::test]
    async fn test_failure_is_shared() {
        let latch = RefreshLatch::new();
        let observed = latch.generation();
        assert_eq!(
            latch.refresh(observed, || async { false }).await,
            RefreshOutcome::Failed
        );
        assert_eq!(
            latch.refresh(observed, || async { true }).await,
            RefreshOutcome::Failed
        );
    }

    #[tokio::test]
    async fn test_new_generation_refreshes_again() {
        let latch = RefreshLatch::new();
        latch.refresh(latch.generation(), || async { true }).await;
        let outcome = latch.refresh(latch.generation(), || async { true }).await;
        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(latch.generation(), 2);
    }
}
