//! Store runtime for coordinating reducer execution and effect handling.

use crate::cancellation::{CancellationRegistry, Registration};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::handle::{AtomicCounterGuard, DecrementGuard, EffectHandle, EffectTracking, TrackingMode};
use futures::stream::{Abortable, BoxStream, StreamExt};
use reducer_kit_core::{Effect, EffectId, Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};

/// The Store - runtime coordinator for a reducer
///
/// The Store owns:
/// 1. State (behind `RwLock`; the write lock is the single dispatch path)
/// 2. Reducer (the root of the application's reducer tree)
/// 3. Environment (bound once, at construction)
/// 4. Effect execution (with feedback into [`send`](Self::send))
///
/// Every reduction, whether triggered by a caller or by an effect, runs while
/// holding the write lock, so no two reducer calls ever overlap and every
/// action observes the state left by the previous one. Cloning a store is
/// cheap and yields another handle onto the same state.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let store = Store::new(AppState::default(), app_reducer(), AppEnvironment::mock());
///
/// store.send(AppAction::Counter(CounterAction::Increment)).await?;
/// let count = store.state(|s| s.count).await;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: Arc<R>,
    environment: Arc<E>,
    config: StoreConfig,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
    cancellations: Arc<CancellationRegistry>,
    /// Every action produced by an effect is broadcast here before it is
    /// fed back, so observers can follow request/response flows.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Uses [`StoreConfig::default()`].
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_config(initial_state, reducer, environment, StoreConfig::default())
    }

    /// Create a new Store with custom configuration
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = StoreConfig::default().with_broadcast_capacity(256);
    /// let store = Store::with_config(AppState::default(), app_reducer(), env, config);
    /// ```
    #[must_use]
    pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
        let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            cancellations: Arc::new(CancellationRegistry::default()),
            action_broadcast,
        }
    }

    /// The configuration this store was built with
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of effects currently running across the whole store
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.pending_effects.load(Ordering::Acquire)
    }

    /// Whether [`shutdown`](Self::shutdown) has been initiated
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Initiate graceful shutdown of the store
    ///
    /// This method:
    /// 1. Sets the shutdown flag (rejecting new actions, including feedback)
    /// 2. Waits for pending effects to complete
    /// 3. Returns when all effects finish or `timeout` expires
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
    /// pending effects complete.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        metrics::counter!("store.shutdown.initiated").increment(1);

        self.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(10);

        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                metrics::counter!("store.shutdown.completed").increment(1);
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(
                    pending_effects = pending,
                    "Shutdown timeout: {} effects still running",
                    pending
                );
                metrics::counter!("store.shutdown.timeout").increment(1);
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tracing::trace!(
                pending_effects = pending,
                elapsed_ms = start.elapsed().as_millis(),
                "Waiting for effects to complete"
            );

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Shut down using the configured default timeout
    ///
    /// # Errors
    ///
    /// See [`shutdown`](Self::shutdown).
    pub async fn shutdown_with_default_timeout(&self) -> Result<(), StoreError> {
        self.shutdown(self.config.default_shutdown_timeout).await
    }

    /// Send an action to the store
    ///
    /// 1. Acquires the write lock on state (queueing behind earlier senders)
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Releases the lock and starts the returned effects
    ///
    /// Effects run on spawned tasks. Each action they produce is broadcast
    /// and then sent back through this method, so it is reduced on the same
    /// serial path. `send()` returns after starting the effects, not after
    /// they complete; use the returned [`EffectHandle`] to wait for them.
    ///
    /// Synchronous effects are no exception: their value always arrives as
    /// a separate dispatch after this call has released the lock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    ///
    /// # Panics
    ///
    /// If the reducer panics, the panic propagates to the caller.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        self.send_internal(action, TrackingMode::Direct).await
    }

    /// Send an action and track its whole effect cascade
    ///
    /// The returned handle's [`wait`](EffectHandle::wait) only resolves once
    /// the effects of this action, and the effects of every action they fed
    /// back, have finished.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    #[tracing::instrument(skip(self, action), name = "store_send_cascading")]
    pub async fn send_cascading(&self, action: A) -> Result<EffectHandle, StoreError> {
        self.send_internal(action, TrackingMode::cascading()).await
    }

    /// Send an action and wait for a matching effect-produced action
    ///
    /// Subscribes to the action broadcast before sending, so a result that
    /// arrives immediately is not missed.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action arrived in time
    /// - [`StoreError::ChannelClosed`]: the action broadcast channel closed
    /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut rx = self.action_broadcast.subscribe();

        self.send(action).await?;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged, {} actions skipped", skipped);
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to all actions produced by effects
    ///
    /// Actions sent directly through [`send`](Self::send) are not broadcast.
    /// A receiver that falls behind skips old actions and observes
    /// [`RecvError::Lagged`](broadcast::error::RecvError::Lagged).
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let favorites = store.state(|s| s.favorite_primes.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// Clone a snapshot of the current state
    pub async fn current_state(&self) -> S
    where
        S: Clone,
    {
        self.state.read().await.clone()
    }

    #[tracing::instrument(skip(self, action, tracking_mode), name = "store_send_internal")]
    async fn send_internal(
        &self,
        action: A,
        tracking_mode: TrackingMode,
    ) -> Result<EffectHandle, StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        tracing::debug!("Processing action");
        metrics::counter!("store.actions.total").increment(1);

        let (handle, tracking) = EffectHandle::new(tracking_mode);

        let effects = {
            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let span = tracing::debug_span!("reducer_execution");
            let _enter = span.enter();

            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut *state, action, &*self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            tracing::trace!("Reducer completed, returned {} effects", effects.len());

            #[allow(clippy::cast_precision_loss)] // effect counts are tiny
            metrics::histogram!("store.effects.count").record(effects.len() as f64);

            effects
        };

        for effect in effects {
            self.execute_effect(effect, &tracking);
        }

        Ok(handle)
    }

    /// Start one effect
    fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
        self.start_effect(effect, tracking, &[]);
    }

    /// Start one effect inside the cancellation scopes `scopes`
    ///
    /// - `None`: no-op
    /// - `Cancel`: aborts every live effect registered under the id
    /// - `Parallel`: starts each child with the same tracking and scopes
    /// - `Sequential`: one task starting each child after the previous finished
    /// - `Cancellable`: the inner effect, with `id` added to its scopes
    /// - everything else: driven as a stream on its own task
    ///
    /// Every task started here is registered once per enclosing id, so
    /// cancelling any of them stops it.
    fn start_effect(&self, effect: Effect<A>, tracking: &EffectTracking, scopes: &[EffectId]) {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Cancel(id) => {
                let cancelled = self.cancellations.cancel(&id);
                tracing::debug!(effect_id = %id, cancelled, "Cancelled in-flight effects");
                metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                metrics::counter!("store.effects.cancelled").increment(cancelled as u64);
            },
            Effect::Parallel(effects) => {
                tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                for effect in effects {
                    self.start_effect(effect, tracking, scopes);
                }
            },
            Effect::Sequential(effects) => {
                tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                self.spawn_sequential(effects, tracking, scopes.to_vec());
            },
            Effect::Cancellable { id, effect } => {
                tracing::trace!(effect_id = %id, "Executing Effect::Cancellable");
                metrics::counter!("store.effects.executed", "type" => "cancellable").increment(1);
                let mut inner = scopes.to_vec();
                inner.push(id);
                self.start_effect(*effect, tracking, &inner);
            },
            other => {
                let kind = effect_kind(&other);
                tracing::trace!("Executing Effect::{}", kind);
                metrics::counter!("store.effects.executed", "type" => kind).increment(1);

                let mut stream = other.into_stream();
                let mut registrations = Vec::with_capacity(scopes.len());
                for id in scopes {
                    let (registration, abort) = self.cancellations.register(id.clone());
                    stream = Abortable::new(stream, abort).boxed();
                    registrations.push(registration);
                }
                self.spawn_stream(stream, registrations, tracking);
            },
        }
    }

    /// Register a task under every id in `scopes`
    fn register_all(&self, scopes: &[EffectId]) -> Vec<Registration> {
        scopes
            .iter()
            .map(|id| self.cancellations.register(id.clone()).0)
            .collect()
    }

    /// Drive a stream of actions on a new task, feeding each one back
    fn spawn_stream(
        &self,
        mut stream: BoxStream<'static, A>,
        registrations: Vec<Registration>,
        tracking: &EffectTracking,
    ) {
        tracking.increment();
        let guard = DecrementGuard(tracking.clone());

        self.pending_effects.fetch_add(1, Ordering::SeqCst);
        let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

        let store = self.clone();

        tokio::spawn(async move {
            let _pending_guard = pending_guard;

            while let Some(action) = stream.next().await {
                if any_aborted(&registrations) {
                    tracing::trace!("Dropping action from cancelled effect");
                    break;
                }
                if store.feed_back(action, &guard.0).await.is_err() {
                    break;
                }
            }

            store.cancellations.complete_all(&registrations);
            drop(guard);
        });
    }

    fn spawn_sequential(&self, effects: Vec<Effect<A>>, tracking: &EffectTracking, scopes: Vec<EffectId>) {
        tracking.increment();
        let guard = DecrementGuard(tracking.clone());

        self.pending_effects.fetch_add(1, Ordering::SeqCst);
        let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

        // Cancelling an enclosing id also stops the steps not yet started
        let registrations = self.register_all(&scopes);
        let store = self.clone();
        let total = effects.len();

        tokio::spawn(async move {
            let _pending_guard = pending_guard;

            for (idx, effect) in effects.into_iter().enumerate() {
                if any_aborted(&registrations) {
                    tracing::trace!("Sequential effect cancelled before step {}", idx + 1);
                    break;
                }
                tracing::trace!("Executing sequential effect {} of {}", idx + 1, total);

                // Shares the parent's mode so cascades still land on the parent
                let (mut step, step_tracking) = EffectHandle::new(guard.0.mode.clone());
                store.start_effect(effect, &step_tracking, &scopes);
                drop(step_tracking);
                step.settle().await;
            }

            store.cancellations.complete_all(&registrations);
            tracing::trace!("Effect::Sequential completed");
            drop(guard);
        });
    }

    /// Broadcast an effect-produced action and dispatch it
    ///
    /// An error means the store rejected the action and the effect should
    /// stop producing.
    async fn feed_back(&self, action: A, tracking: &EffectTracking) -> Result<(), StoreError> {
        let _ = self.action_broadcast.send(action.clone());

        let result = if tracking.mode.is_cascading() {
            self.send_internal(action, TrackingMode::cascading()).await
        } else {
            self.send(action).await
        };

        match result {
            Ok(child) => {
                tracking.adopt(child);
                Ok(())
            },
            Err(error) => {
                tracing::warn!(%error, "Dropped action produced by effect");
                Err(error)
            },
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
            config: self.config.clone(),
            shutdown: Arc::clone(&self.shutdown),
            pending_effects: Arc::clone(&self.pending_effects),
            cancellations: Arc::clone(&self.cancellations),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

fn any_aborted(registrations: &[Registration]) -> bool {
    registrations.iter().any(|r| r.handle.is_aborted())
}

/// Metric label for the effects driven as plain streams
const fn effect_kind<A>(effect: &Effect<A>) -> &'static str {
    match effect {
        Effect::None => "none",
        Effect::Sync(_) => "sync",
        Effect::Future(_) => "future",
        Effect::Stream(_) => "stream",
        Effect::Delay { .. } => "delay",
        Effect::Parallel(_) => "parallel",
        Effect::Sequential(_) => "sequential",
        Effect::Cancellable { .. } => "cancellable",
        Effect::Cancel(_) => "cancel",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)] // Test code can unwrap and panic
mod tests {
    use super::*;
    use futures::stream;
    use reducer_kit_core::{EffectId, SmallVec, smallvec};

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
        log: Vec<String>,
    }

    impl TestState {
        fn new(value: i32) -> Self {
            Self { value, log: Vec::new() }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        Decrement,
        NoOp,
        ProduceEffect,
        ProduceSync,
        ProduceDelayedAction,
        ProduceParallelEffects,
        ProduceSequentialEffects,
        ProduceStream,
        ProducePanickingEffect,
        ProduceSlowEffect,
        StartTicker,
        StopTicker,
        StartGroupedTickers,
        StopInnerTicker,
        StopGroup,
        StartSteps,
        StopSteps,
        SyncAndDelayed,
        Tick,
        Chain(u32),
        Log(String),
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment | TestAction::Tick => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::Decrement => {
                    state.value -= 1;
                    smallvec![Effect::None]
                },
                TestAction::NoOp => smallvec![Effect::None],
                TestAction::ProduceEffect => {
                    smallvec![Effect::future(async { Some(TestAction::Increment) })]
                },
                TestAction::ProduceSync => {
                    state.log.push("sync requested".to_string());
                    smallvec![Effect::sync(|| TestAction::Log("sync delivered".to_string()))]
                },
                TestAction::ProduceDelayedAction => {
                    smallvec![Effect::delay(Duration::from_millis(10), TestAction::Increment)]
                },
                TestAction::ProduceParallelEffects => {
                    smallvec![Effect::Parallel(vec![
                        Effect::future(async { Some(TestAction::Increment) }),
                        Effect::future(async { Some(TestAction::Increment) }),
                        Effect::future(async { Some(TestAction::Increment) }),
                    ])]
                },
                TestAction::ProduceSequentialEffects => {
                    smallvec![Effect::Sequential(vec![
                        Effect::delay(Duration::from_millis(20), TestAction::Log("first".to_string())),
                        Effect::sync(|| TestAction::Log("second".to_string())),
                        Effect::future(async { Some(TestAction::Log("third".to_string())) }),
                    ])]
                },
                TestAction::ProduceStream => {
                    smallvec![Effect::stream(stream::iter(vec![
                        TestAction::Increment,
                        TestAction::Increment,
                        TestAction::Decrement,
                    ]))]
                },
                TestAction::ProducePanickingEffect => {
                    smallvec![Effect::Future(Box::pin(async {
                        panic!("Intentional panic in effect for testing");
                    }))]
                },
                TestAction::ProduceSlowEffect => {
                    smallvec![Effect::future(async {
                        tokio::time::sleep(Duration::from_millis(500)).await;
                        Some(TestAction::Increment)
                    })]
                },
                TestAction::StartTicker => {
                    let ticks = stream::unfold((), |()| async {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some((TestAction::Tick, ()))
                    });
                    smallvec![Effect::stream(ticks).cancellable("ticker")]
                },
                TestAction::StopTicker => smallvec![Effect::cancel("ticker")],
                TestAction::StartGroupedTickers => {
                    let ticks = every(Duration::from_millis(5), TestAction::Tick);
                    let tocks = every(Duration::from_millis(5), TestAction::Log("tock".to_string()));
                    smallvec![Effect::merge(vec![ticks.cancellable("inner"), tocks]).cancellable("group")]
                },
                TestAction::StopInnerTicker => smallvec![Effect::cancel("inner")],
                TestAction::StopGroup => smallvec![Effect::cancel("group")],
                TestAction::StartSteps => smallvec![
                    Effect::chain(vec![
                        Effect::delay(Duration::from_millis(20), TestAction::Log("step one".to_string())),
                        Effect::delay(Duration::from_millis(60), TestAction::Log("step two".to_string())),
                    ])
                    .cancellable("steps")
                ],
                TestAction::StopSteps => smallvec![Effect::cancel("steps")],
                TestAction::SyncAndDelayed => smallvec![
                    Effect::sync(|| TestAction::Log("sync".to_string())),
                    Effect::future(async {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Some(TestAction::Log("delayed".to_string()))
                    }),
                ],
                TestAction::Chain(0) => smallvec![Effect::None],
                TestAction::Chain(n) => {
                    state.value += 1;
                    smallvec![Effect::delay(Duration::from_millis(5), TestAction::Chain(n - 1))]
                },
                TestAction::Log(entry) => {
                    state.log.push(entry);
                    smallvec![Effect::None]
                },
            }
        }
    }

    fn every(period: Duration, action: TestAction) -> Effect<TestAction> {
        Effect::stream(stream::unfold(action, move |action| async move {
            tokio::time::sleep(period).await;
            Some((action.clone(), action))
        }))
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState::new(0), TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = store();
        assert_eq!(store.state(|s| s.value).await, 0);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn test_multiple_actions() {
        let store = Store::new(TestState::new(2), TestReducer, TestEnv);

        store.send(TestAction::Increment).await.unwrap();
        store.send(TestAction::Increment).await.unwrap();
        store.send(TestAction::Decrement).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test]
    async fn test_effect_none() {
        let store = store();
        let handle = store.send(TestAction::NoOp).await.unwrap();
        assert_eq!(handle.pending(), 0);
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_effect_future() {
        let store = store();

        let mut handle = store.send(TestAction::ProduceEffect).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_sync_effect_is_not_applied_inline() {
        let store = store();

        let mut handle = store.send(TestAction::ProduceSync).await.unwrap();
        // On the current-thread runtime the effect task cannot have run yet
        assert_eq!(store.state(|s| s.log.clone()).await, vec!["sync requested".to_string()]);

        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(
            store.state(|s| s.log.clone()).await,
            vec!["sync requested".to_string(), "sync delivered".to_string()]
        );
    }

    #[tokio::test]
    async fn test_effect_delay() {
        let store = store();

        let mut handle = store.send(TestAction::ProduceDelayedAction).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 0);

        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_parallel() {
        let store = store();

        let mut handle = store.send(TestAction::ProduceParallelEffects).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test]
    async fn test_effect_sequential_preserves_order() {
        let store = store();

        let mut handle = store.send(TestAction::ProduceSequentialEffects).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(
            store.state(|s| s.log.clone()).await,
            vec!["first".to_string(), "second".to_string(), "third".to_string()]
        );
    }

    #[tokio::test]
    async fn test_effect_stream() {
        let store = store();

        let mut handle = store.send(TestAction::ProduceStream).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_sends() {
        let store = store();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let _ = store.send(TestAction::Increment).await;
                })
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                panic!("concurrent send task panicked: {e}");
            }
        }

        assert_eq!(store.state(|s| s.value).await, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_serial_dispatch_under_concurrent_effects() {
        let store = store();
        let mut handles = Vec::new();

        for _ in 0..25 {
            handles.push(store.send(TestAction::ProduceSync).await.unwrap());
            handles.push(store.send(TestAction::ProduceDelayedAction).await.unwrap());
            handles.push(store.send(TestAction::ProduceParallelEffects).await.unwrap());
        }

        for handle in &mut handles {
            handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();
        }

        // 25 delayed increments plus 75 parallel increments, none lost
        assert_eq!(store.state(|s| s.value).await, 100);
        assert_eq!(store.state(|s| s.log.len()).await, 50);
    }

    #[tokio::test]
    async fn test_store_clone_shares_state() {
        let store1 = store();
        let store2 = store1.clone();

        store1.send(TestAction::Increment).await.unwrap();
        assert_eq!(store2.state(|s| s.value).await, 1);

        store2.send(TestAction::Increment).await.unwrap();
        assert_eq!(store1.current_state().await.value, 2);
    }

    #[tokio::test]
    async fn test_effect_panic_isolation() {
        let store = store();

        let mut handle = store.send(TestAction::ProducePanickingEffect).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        store.send(TestAction::Increment).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_stream_emissions() {
        let store = store();

        let mut ticker = store.send(TestAction::StartTicker).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        store.send(TestAction::StopTicker).await.unwrap();
        ticker.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        let after_cancel = store.state(|s| s.value).await;
        assert!(after_cancel > 0, "ticker should have ticked before cancellation");

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.state(|s| s.value).await, after_cancel);
        assert_eq!(store.cancellations.live(&EffectId::new("ticker")), 0);
    }

    #[tokio::test]
    async fn test_cancel_reaches_inner_cancellable() {
        let store = store();
        let tocks = |s: &TestState| s.log.iter().filter(|e| *e == "tock").count();

        let mut group = store.send(TestAction::StartGroupedTickers).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        store.send(TestAction::StopInnerTicker).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let ticks_after_cancel = store.state(|s| s.value).await;
        let tocks_after_cancel = store.state(tocks).await;
        assert!(ticks_after_cancel > 0);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.state(|s| s.value).await, ticks_after_cancel);
        assert!(store.state(tocks).await > tocks_after_cancel, "sibling stream keeps running");

        store.send(TestAction::StopGroup).await.unwrap();
        group.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.cancellations.live(&EffectId::new("group")), 0);
        assert_eq!(store.cancellations.live(&EffectId::new("inner")), 0);
    }

    #[tokio::test]
    async fn test_cancel_outer_stops_inner_cancellable() {
        let store = store();

        let mut group = store.send(TestAction::StartGroupedTickers).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        store.send(TestAction::StopGroup).await.unwrap();
        group.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        let settled = store.current_state().await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        let later = store.current_state().await;
        assert_eq!(later.value, settled.value);
        assert_eq!(later.log, settled.log);
        assert_eq!(store.cancellations.live(&EffectId::new("inner")), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_remaining_sequential_steps() {
        let store = store();

        let mut steps = store.send(TestAction::StartSteps).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        store.send(TestAction::StopSteps).await.unwrap();
        steps.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.state(|s| s.log.clone()).await, vec!["step one".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sync_and_delayed_effects_each_apply_once() {
        for _ in 0..20 {
            let store = store();

            let mut handle = store.send(TestAction::SyncAndDelayed).await.unwrap();
            handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

            let log = store.state(|s| s.log.clone()).await;
            assert_eq!(log.len(), 2, "unexpected log {log:?}");
            assert_eq!(log.iter().filter(|e| *e == "sync").count(), 1);
            assert_eq!(log.iter().filter(|e| *e == "delayed").count(), 1);
        }
    }

    #[tokio::test]
    async fn test_cancel_without_live_effect_is_noop() {
        let store = store();
        let handle = store.send(TestAction::StopTicker).await.unwrap();
        assert_eq!(handle.pending(), 0);
    }

    #[tokio::test]
    async fn test_direct_handle_ignores_cascade() {
        let store = store();

        let mut handle = store.send(TestAction::Chain(3)).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        // Only the first delayed hop is tracked
        assert!(store.state(|s| s.value).await < 3);
    }

    #[tokio::test]
    async fn test_cascading_handle_waits_for_whole_chain() {
        let store = store();

        let mut handle = store.send_cascading(TestAction::Chain(3)).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 3);
    }

    mod shutdown_tests {
        use super::*;

        #[tokio::test]
        async fn test_shutdown_with_no_pending_effects() {
            let store = store();
            assert!(store.shutdown(Duration::from_secs(5)).await.is_ok());
            assert!(store.is_shutting_down());
        }

        #[tokio::test]
        async fn test_shutdown_rejects_new_actions() {
            let store = store();
            store.shutdown(Duration::from_secs(1)).await.unwrap();

            let result = store.send(TestAction::Increment).await;
            assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
            assert_eq!(store.state(|s| s.value).await, 0);
        }

        #[tokio::test]
        async fn test_shutdown_waits_for_effects() {
            let store = store();
            let _handle = store.send(TestAction::ProduceDelayedAction).await.unwrap();

            assert!(store.shutdown(Duration::from_secs(5)).await.is_ok());
            assert_eq!(store.pending_effects(), 0);
        }

        #[tokio::test]
        async fn test_shutdown_timeout() {
            let store = store();
            let _slow = store.send(TestAction::ProduceSlowEffect).await.unwrap();

            let result = store.shutdown(Duration::from_millis(50)).await;
            assert!(
                matches!(result, Err(StoreError::ShutdownTimeout(pending)) if pending > 0),
                "Expected ShutdownTimeout, got: {result:?}"
            );
        }

        #[tokio::test]
        async fn test_shutdown_stops_running_streams() {
            let store = store();
            let _ticker = store.send(TestAction::StartTicker).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;

            // The ticker's next emission is rejected, which ends it
            assert!(store.shutdown(Duration::from_secs(1)).await.is_ok());
        }

        #[tokio::test]
        async fn test_shutdown_idempotent() {
            let store = Store::with_config(
                TestState::new(0),
                TestReducer,
                TestEnv,
                StoreConfig::default().with_shutdown_timeout(Duration::from_millis(100)),
            );

            assert!(store.shutdown_with_default_timeout().await.is_ok());
            assert!(store.shutdown_with_default_timeout().await.is_ok());
        }
    }
}
