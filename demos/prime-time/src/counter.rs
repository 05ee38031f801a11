//! Counter feature
//!
//! A number the user steps up and down, plus a button that asks the
//! network for the n-th prime, where n is the current count. The counter
//! view embeds the [prime modal](crate::prime_modal) next to it.

use crate::prime_modal::{PrimeModalAction, PrimeModalReducer, PrimeModalState};
use reducer_kit_core::{Effect, Lens, Reducer, ReducerExt, SmallVec, smallvec};
use reducer_kit_macros::CasePaths;
use std::fmt;
use std::sync::Arc;

/// Alert announcing a looked-up prime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimeAlert {
    /// The prime that came back
    pub prime: i64,
}

impl PrimeAlert {
    /// Alert text for a lookup of the `n`-th prime
    #[must_use]
    pub fn title(&self, n: i64) -> String {
        format!("The {} prime is {}", ordinal(n), self.prime)
    }
}

/// State owned by the counter itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    /// Current count
    pub count: i64,
    /// Set while an answer is on screen
    pub alert_nth_prime: Option<PrimeAlert>,
    /// Set while a lookup is in flight
    pub is_nth_prime_button_disabled: bool,
}

/// Counter actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    /// Count down by one
    Decrement,
    /// Count up by one
    Increment,
    /// Start looking up the `count`-th prime
    NthPrimeButtonTapped,
    /// Lookup finished; `None` on any failure
    NthPrimeResponse(Option<i64>),
    /// Close the alert
    AlertDismissButtonTapped,
}

/// Produces the lookup effect for a given n
pub type NthPrimeFn = Arc<dyn Fn(i64) -> Effect<Option<i64>> + Send + Sync>;

/// Counter dependencies
#[derive(Clone)]
pub struct CounterEnvironment {
    nth_prime: NthPrimeFn,
}

impl CounterEnvironment {
    /// Environment backed by the given lookup
    #[must_use]
    pub fn new<F>(nth_prime: F) -> Self
    where
        F: Fn(i64) -> Effect<Option<i64>> + Send + Sync + 'static,
    {
        Self {
            nth_prime: Arc::new(nth_prime),
        }
    }

    /// Environment whose lookup always answers 17
    #[must_use]
    pub fn mock() -> Self {
        Self::new(|_| Effect::sync(|| Some(17)))
    }

    /// Build the lookup effect for `n`
    #[must_use]
    pub fn nth_prime(&self, n: i64) -> Effect<Option<i64>> {
        (self.nth_prime)(n)
    }
}

impl fmt::Debug for CounterEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterEnvironment").finish_non_exhaustive()
    }
}

/// Counter reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = CounterState;
    type Action = CounterAction;
    type Environment = CounterEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CounterAction::Decrement => {
                state.count -= 1;
                SmallVec::new()
            },
            CounterAction::Increment => {
                state.count += 1;
                SmallVec::new()
            },
            CounterAction::NthPrimeButtonTapped => {
                state.is_nth_prime_button_disabled = true;
                smallvec![env.nth_prime(state.count).map(CounterAction::NthPrimeResponse)]
            },
            CounterAction::NthPrimeResponse(prime) => {
                state.is_nth_prime_button_disabled = false;
                state.alert_nth_prime = prime.map(|prime| PrimeAlert { prime });
                SmallVec::new()
            },
            CounterAction::AlertDismissButtonTapped => {
                state.alert_nth_prime = None;
                SmallVec::new()
            },
        }
    }
}

/// Everything the counter screen shows: the counter and its modal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterViewState {
    /// Alert for the last lookup
    pub alert_nth_prime: Option<PrimeAlert>,
    /// Current count
    pub count: i64,
    /// Saved favorites
    pub favorite_primes: Vec<i64>,
    /// Set while a lookup is in flight
    pub is_nth_prime_button_disabled: bool,
}

impl CounterViewState {
    /// The counter's slice of the screen
    #[must_use]
    pub fn counter_lens() -> Lens<Self, CounterState> {
        Lens::new(
            |view: &Self| CounterState {
                count: view.count,
                alert_nth_prime: view.alert_nth_prime,
                is_nth_prime_button_disabled: view.is_nth_prime_button_disabled,
            },
            |view: &mut Self, counter: CounterState| {
                view.count = counter.count;
                view.alert_nth_prime = counter.alert_nth_prime;
                view.is_nth_prime_button_disabled = counter.is_nth_prime_button_disabled;
            },
        )
    }

    /// The modal's slice of the screen
    #[must_use]
    pub fn prime_modal_lens() -> Lens<Self, PrimeModalState> {
        Lens::new(
            |view: &Self| PrimeModalState {
                count: view.count,
                favorite_primes: view.favorite_primes.clone(),
            },
            |view: &mut Self, modal: PrimeModalState| {
                view.count = modal.count;
                view.favorite_primes = modal.favorite_primes;
            },
        )
    }
}

/// Actions of the counter screen
#[derive(CasePaths, Debug, Clone, PartialEq, Eq)]
pub enum CounterViewAction {
    /// From the counter
    Counter(CounterAction),
    /// From the prime modal
    PrimeModal(PrimeModalAction),
}

/// Counter and prime modal, lifted onto the counter screen and combined
#[must_use]
pub fn counter_view_reducer()
-> impl Reducer<State = CounterViewState, Action = CounterViewAction, Environment = CounterEnvironment>
+ Send
+ Sync
+ 'static {
    let counter = CounterReducer.pullback(
        CounterViewState::counter_lens(),
        CounterViewAction::counter_case(),
        |env: &CounterEnvironment| env.clone(),
    );
    let prime_modal = PrimeModalReducer.pullback(
        CounterViewState::prime_modal_lens(),
        CounterViewAction::prime_modal_case(),
        |_: &CounterEnvironment| (),
    );

    counter.combine(prime_modal)
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st
#[must_use]
pub fn ordinal(n: i64) -> String {
    let suffix = match (n.rem_euclid(10), n.rem_euclid(100)) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reducer_kit_testing::{ReducerTest, Step, assert_steps, assertions};

    #[test]
    fn test_incr_and_decr_steps() {
        assert_steps(
            CounterViewState {
                count: 2,
                ..CounterViewState::default()
            },
            &counter_view_reducer(),
            &CounterEnvironment::mock(),
            vec![
                Step::send(CounterViewAction::Counter(CounterAction::Increment), |s: &mut CounterViewState| s.count = 3),
                Step::send(CounterViewAction::Counter(CounterAction::Increment), |s: &mut CounterViewState| s.count = 4),
                Step::send(CounterViewAction::Counter(CounterAction::Decrement), |s: &mut CounterViewState| s.count = 3),
            ],
        );
    }

    #[test]
    fn test_decrement_has_no_effects() {
        ReducerTest::new(CounterReducer)
            .with_env(CounterEnvironment::mock())
            .given_state(CounterState {
                count: 2,
                ..CounterState::default()
            })
            .when_action(CounterAction::Decrement)
            .then_state(|s| assert_eq!(s.count, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_nth_prime_tap_disables_button_and_returns_one_effect() {
        ReducerTest::new(CounterReducer)
            .with_env(CounterEnvironment::mock())
            .given_state(CounterState::default())
            .when_action(CounterAction::NthPrimeButtonTapped)
            .then_state(|s| assert!(s.is_nth_prime_button_disabled))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
            })
            .run();
    }

    #[test]
    fn test_lookup_receives_count() {
        let env = CounterEnvironment::new(|n| Effect::sync(move || Some(n * 10)));
        let mut state = CounterState {
            count: 4,
            ..CounterState::default()
        };

        let effects = CounterReducer.reduce(&mut state, CounterAction::NthPrimeButtonTapped, &env);
        assertions::assert_effect_actions(effects, &[CounterAction::NthPrimeResponse(Some(40))]);
    }

    #[test]
    fn test_alert_dismiss_keeps_button_enabled() {
        let mut state = CounterState {
            count: 7,
            alert_nth_prime: Some(PrimeAlert { prime: 17 }),
            is_nth_prime_button_disabled: false,
        };

        let effects = CounterReducer.reduce(&mut state, CounterAction::AlertDismissButtonTapped, &CounterEnvironment::mock());

        assert!(effects.is_empty());
        assert_eq!(state.alert_nth_prime, None);
        assert!(!state.is_nth_prime_button_disabled);
    }

    #[test]
    fn test_counter_lens_leaves_favorites_alone() {
        let lens = CounterViewState::counter_lens();
        let mut view = CounterViewState {
            count: 1,
            favorite_primes: vec![2, 3],
            ..CounterViewState::default()
        };

        lens.modify(&mut view, |counter| counter.count = 9);

        assert_eq!(view.count, 9);
        assert_eq!(view.favorite_primes, vec![2, 3]);
    }

    #[test]
    fn test_ordinal() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101, 111, 0].into_iter().map(ordinal).collect();
        assert_eq!(
            rendered,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st", "111th", "0th"]
        );
    }

    #[test]
    fn test_alert_title() {
        assert_eq!(PrimeAlert { prime: 17 }.title(7), "The 7th prime is 17");
    }
}
