//! Scripted reducer tests: a list of steps, each with its expected change
//!
//! A [`Step`] either sends an action or receives the next action produced by
//! an earlier step's effects. After each step the state is compared with
//! the previous state plus the step's expected update, so a test spells out
//! every change it expects and nothing else.

use crate::helpers::run_effect;
use reducer_kit_core::Reducer;
use std::collections::VecDeque;
use std::fmt;
use std::panic::Location;

/// Whether a step originates from the caller or from an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// The action is dispatched by the test
    Send,
    /// The action must be the next one produced by pending effects
    Receive,
}

/// One scripted action and the state change it should cause
pub struct Step<S, A> {
    kind: StepKind,
    action: A,
    update: Box<dyn FnOnce(&mut S)>,
    location: &'static Location<'static>,
}

impl<S, A> Step<S, A> {
    /// Dispatch `action`; `update` applies the expected change
    #[track_caller]
    pub fn send(action: A, update: impl FnOnce(&mut S) + 'static) -> Self {
        Self::new(StepKind::Send, action, update)
    }

    /// Expect `action` from an effect; `update` applies the expected change
    #[track_caller]
    pub fn receive(action: A, update: impl FnOnce(&mut S) + 'static) -> Self {
        Self::new(StepKind::Receive, action, update)
    }

    #[track_caller]
    fn new(kind: StepKind, action: A, update: impl FnOnce(&mut S) + 'static) -> Self {
        Self {
            kind,
            action,
            update: Box::new(update),
            location: Location::caller(),
        }
    }

    /// Send or receive
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        self.kind
    }
}

impl<S, A: fmt::Debug> fmt::Debug for Step<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind)
            .field("action", &self.action)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Run `steps` against `reducer`, starting from `initial`
///
/// Effects returned by each step are driven to completion immediately (see
/// [`run_effect`]) and their actions queue up for `receive` steps. The
/// script must consume every produced action: sending while actions are
/// queued, or finishing with actions left over, fails the test.
///
/// Must not be called from inside an async runtime.
///
/// # Panics
///
/// Panics, pointing at the offending step, when the state after a step
/// differs from the expectation or when received actions do not match.
///
/// # Example
///
/// ```ignore
/// assert_steps(
///     CounterViewState { count: 2, ..Default::default() },
///     &counter_view_reducer(),
///     &CounterEnvironment::mock(),
///     vec![
///         Step::send(CounterViewAction::Counter(CounterAction::Increment), |s| s.count = 3),
///         Step::send(CounterViewAction::Counter(CounterAction::Increment), |s| s.count = 4),
///         Step::send(CounterViewAction::Counter(CounterAction::Decrement), |s| s.count = 3),
///     ],
/// );
/// ```
#[allow(clippy::panic)] // Assertion helper: failing means panicking
pub fn assert_steps<R, S, A, E>(
    initial: S,
    reducer: &R,
    environment: &E,
    steps: Vec<Step<S, A>>,
) where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: Clone + PartialEq + fmt::Debug,
    A: Clone + PartialEq + fmt::Debug + Send + 'static,
{
    let mut state = initial;
    let mut received: VecDeque<A> = VecDeque::new();

    for step in steps {
        let location = step.location;
        let action = match step.kind {
            StepKind::Send => {
                assert!(
                    received.is_empty(),
                    "{location}: must receive {received:?} before sending {:?}",
                    step.action
                );
                step.action
            },
            StepKind::Receive => {
                let Some(next) = received.pop_front() else {
                    panic!("{location}: expected to receive {:?}, but no action was produced", step.action);
                };
                assert_eq!(next, step.action, "{location}: received an unexpected action");
                next
            },
        };

        let mut expected = state.clone();
        let effects = reducer.reduce(&mut state, action, environment);
        (step.update)(&mut expected);
        assert_eq!(state, expected, "{location}: state does not match the expected update");

        for effect in effects {
            received.extend(run_effect(effect));
        }
    }

    assert!(
        received.is_empty(),
        "script finished with unreceived actions: {received:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use reducer_kit_core::{Effect, SmallVec, reducer, smallvec};

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        count: i64,
        busy: bool,
        answer: Option<i64>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Action {
        Incr,
        Decr,
        Ask,
        Answer(Option<i64>),
    }

    fn counter() -> impl Reducer<State = Counter, Action = Action, Environment = Option<i64>> {
        reducer::from_fn(|state: &mut Counter, action: Action, env: &Option<i64>| match action {
            Action::Incr => {
                state.count += 1;
                SmallVec::new()
            },
            Action::Decr => {
                state.count -= 1;
                SmallVec::new()
            },
            Action::Ask => {
                state.busy = true;
                let answer = *env;
                smallvec![Effect::sync(move || Action::Answer(answer))]
            },
            Action::Answer(answer) => {
                state.busy = false;
                state.answer = answer;
                SmallVec::new()
            },
        })
    }

    fn start(count: i64) -> Counter {
        Counter {
            count,
            busy: false,
            answer: None,
        }
    }

    #[test]
    fn test_send_steps() {
        assert_steps(
            start(2),
            &counter(),
            &None,
            vec![
                Step::send(Action::Incr, |s: &mut Counter| s.count = 3),
                Step::send(Action::Incr, |s: &mut Counter| s.count = 4),
                Step::send(Action::Decr, |s: &mut Counter| s.count = 3),
            ],
        );
    }

    #[test]
    fn test_receive_steps() {
        assert_steps(
            start(7),
            &counter(),
            &Some(17),
            vec![
                Step::send(Action::Ask, |s: &mut Counter| s.busy = true),
                Step::receive(Action::Answer(Some(17)), |s: &mut Counter| {
                    s.busy = false;
                    s.answer = Some(17);
                }),
            ],
        );
    }

    #[test]
    #[should_panic(expected = "state does not match")]
    fn test_wrong_expectation_fails() {
        assert_steps(start(0), &counter(), &None, vec![Step::send(Action::Incr, |s: &mut Counter| s.count = 2)]);
    }

    #[test]
    #[should_panic(expected = "unreceived actions")]
    fn test_unreceived_effect_fails() {
        assert_steps(start(0), &counter(), &None, vec![Step::send(Action::Ask, |s: &mut Counter| s.busy = true)]);
    }

    #[test]
    #[should_panic(expected = "must receive")]
    fn test_send_before_receive_fails() {
        assert_steps(
            start(0),
            &counter(),
            &None,
            vec![
                Step::send(Action::Ask, |s: &mut Counter| s.busy = true),
                Step::send(Action::Incr, |s: &mut Counter| s.count = 1),
            ],
        );
    }

    #[test]
    fn test_step_records_kind() {
        let step: Step<Counter, Action> = Step::receive(Action::Answer(None), |_| {});
        assert_eq!(step.kind(), StepKind::Receive);
    }
}
