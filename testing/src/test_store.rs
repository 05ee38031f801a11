//! Exhaustive, async store for scripted tests
//!
//! `TestStore` owns its state directly and runs each returned effect to
//! completion before `send` returns, so every action an effect produces is
//! queued and must be claimed with [`TestStore::receive`]. Nothing runs in
//! the background and ordering is deterministic: effects are driven in the
//! order the reducer returned them.

#![allow(clippy::module_name_repetitions)]

use crate::helpers::collect_actions;
use reducer_kit_core::Reducer;
use std::collections::VecDeque;
use std::fmt;

/// Deterministic store that asserts every state change and every received action
///
/// # Example
///
/// ```ignore
/// let mut store = TestStore::new(CounterViewState::default(), counter_view_reducer(), env);
///
/// store.send(CounterAction::NthPrimeButtonTapped, |s| s.is_nth_prime_button_disabled = true).await;
/// store.receive(CounterAction::NthPrimeResponse(Some(17)), |s| {
///     s.is_nth_prime_button_disabled = false;
///     s.alert_nth_prime = Some(17);
/// }).await;
/// store.finish();
/// ```
pub struct TestStore<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: S,
    reducer: R,
    environment: E,
    received: VecDeque<A>,
}

impl<R, S, A, E> TestStore<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: Clone + PartialEq + fmt::Debug,
    A: PartialEq + fmt::Debug + Send + 'static,
{
    /// Create a test store with the given state, reducer and environment
    #[must_use]
    pub const fn new(state: S, reducer: R, environment: E) -> Self {
        Self {
            state,
            reducer,
            environment,
            received: VecDeque::new(),
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Actions produced by effects and not yet received
    #[must_use]
    pub fn pending(&self) -> &VecDeque<A> {
        &self.received
    }

    /// Dispatch `action` and assert the resulting change
    ///
    /// # Panics
    ///
    /// Panics if effect actions are still waiting to be received, or if the
    /// new state is not the previous state with `update` applied.
    pub async fn send(&mut self, action: A, update: impl FnOnce(&mut S)) -> &mut Self {
        assert!(
            self.received.is_empty(),
            "Must receive {:?} before sending {action:?}",
            self.received
        );
        self.apply(action, update).await;
        self
    }

    /// Claim the next effect-produced action and assert the resulting change
    ///
    /// # Panics
    ///
    /// Panics if no action is waiting, if the next one differs from `action`,
    /// or if the state does not match `update`.
    #[allow(clippy::panic)] // Assertion helper: failing means panicking
    pub async fn receive(&mut self, action: A, update: impl FnOnce(&mut S)) -> &mut Self {
        let Some(next) = self.received.pop_front() else {
            panic!("Expected to receive {action:?}, but no effect produced an action");
        };
        assert_eq!(next, action, "Received an unexpected action");
        self.apply(next, update).await;
        self
    }

    /// Assert every effect-produced action was received
    ///
    /// # Panics
    ///
    /// Panics if any action is still pending.
    pub fn finish(&self) {
        assert!(
            self.received.is_empty(),
            "Test finished with unreceived actions: {:?}",
            self.received
        );
    }

    async fn apply(&mut self, action: A, update: impl FnOnce(&mut S)) {
        let mut expected = self.state.clone();
        let effects = self.reducer.reduce(&mut self.state, action, &self.environment);
        update(&mut expected);
        assert_eq!(self.state, expected, "State does not match the expected update");

        for effect in effects {
            let actions = collect_actions(effect).await;
            self.received.extend(actions);
        }
    }
}

impl<R, S, A, E> fmt::Debug for TestStore<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: fmt::Debug,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestStore")
            .field("state", &self.state)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}
