//! Completion tracking for the effects started by one action

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use crate::StoreError;
use tokio::sync::watch;

/// What an [`EffectHandle`] waits for
///
/// `Direct` covers the effects returned for the one action. `Cascading`
/// also covers the effects of every action those effects fed back, all the
/// way down.
#[derive(Debug, Clone)]
pub enum TrackingMode {
    /// Only this action's effects
    Direct,

    /// This action's effects and everything they trigger
    Cascading {
        /// Handles of feedback actions that must settle before this one is done
        children: Arc<Mutex<Vec<EffectHandle>>>,
    },
}

impl TrackingMode {
    /// A fresh cascading mode with no children yet
    #[must_use]
    pub fn cascading() -> Self {
        Self::Cascading {
            children: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Whether feedback actions should be tracked as children
    #[must_use]
    pub const fn is_cascading(&self) -> bool {
        matches!(self, Self::Cascading { .. })
    }
}

/// Completion of the effects one [`Store::send`](crate::Store::send) started
///
/// `send` returns once the reducer ran and the effects were spawned; the
/// handle is how a caller waits for them. Clones share the same counter.
///
/// ```ignore
/// let mut lookup = store.send(CounterAction::NthPrimeButtonTapped).await?;
/// lookup.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    mode: TrackingMode,
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a handle and the tracking context the runtime feeds
    pub(crate) fn new(mode: TrackingMode) -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            mode: mode.clone(),
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            mode,
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            mode: TrackingMode::Direct,
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects started by this action that are still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait until this action's own effects have finished
    pub(crate) async fn settle(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracking context is gone, nothing can still be running
                break;
            }
        }
    }

    /// Wait until nothing tracked by this handle is running
    pub async fn wait(&mut self) {
        self.settle().await;

        if let TrackingMode::Cascading { children } = &self.mode {
            // Children are only appended, so walking by index also picks up
            // handles adopted while an earlier child was being awaited.
            let mut index = 0;
            loop {
                let next = children
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(index)
                    .cloned();
                let Some(mut child) = next else {
                    break;
                };
                Box::pin(child.wait()).await;
                index += 1;
            }
        }
    }

    /// [`wait`](Self::wait) with a deadline
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] if effects are still running after `timeout`.
    /// They keep running; only the wait is abandoned.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("mode", &self.mode)
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Write side of a handle, carried by every task it tracks
#[derive(Clone)]
pub(crate) struct EffectTracking {
    pub(crate) mode: TrackingMode,
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    pub(crate) fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }

    /// Record the handle of a feedback action under a cascading parent
    pub(crate) fn adopt(&self, child: EffectHandle) {
        if let TrackingMode::Cascading { children } = &self.mode {
            children
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(child);
        }
    }
}

/// Marks one tracked effect finished when dropped, including on abort
pub(crate) struct DecrementGuard(pub(crate) EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Same, for the store-wide running-effects count used by shutdown
pub(crate) struct AtomicCounterGuard(pub(crate) Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
