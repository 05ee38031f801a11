//! Application root: global state, actions and the composed reducer

use crate::counter::{CounterViewAction, CounterViewState, PrimeAlert, counter_view_reducer};
use crate::environment::AppEnvironment;
use crate::favorite_primes::{FavoritePrimesAction, FavoritePrimesReducer};
use reducer_kit_core::{Effect, Lens, Reducer, ReducerExt, SmallVec};
use reducer_kit_macros::{CasePaths, Lenses};
use std::fmt;

/// Global state
#[derive(Lenses, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Current count
    pub count: i64,
    /// Saved favorites
    pub favorite_primes: Vec<i64>,
    /// Alert for the last lookup
    pub alert_nth_prime: Option<PrimeAlert>,
    /// Set while a lookup is in flight
    pub is_nth_prime_button_disabled: bool,
}

impl AppState {
    /// The counter screen's slice of the app
    #[must_use]
    pub fn counter_view_lens() -> Lens<Self, CounterViewState> {
        Lens::new(
            |app: &Self| CounterViewState {
                alert_nth_prime: app.alert_nth_prime,
                count: app.count,
                favorite_primes: app.favorite_primes.clone(),
                is_nth_prime_button_disabled: app.is_nth_prime_button_disabled,
            },
            |app: &mut Self, view: CounterViewState| {
                app.alert_nth_prime = view.alert_nth_prime;
                app.count = view.count;
                app.favorite_primes = view.favorite_primes;
                app.is_nth_prime_button_disabled = view.is_nth_prime_button_disabled;
            },
        )
    }
}

/// Global actions
#[derive(CasePaths, Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// From the counter screen
    CounterView(CounterViewAction),
    /// From the favorites list
    FavoritePrimes(FavoritePrimesAction),
}

/// The whole app: every feature pulled back onto [`AppState`] and combined
#[must_use]
pub fn app_reducer()
-> impl Reducer<State = AppState, Action = AppAction, Environment = AppEnvironment> + Send + Sync + 'static {
    let counter_view = counter_view_reducer().pullback(
        AppState::counter_view_lens(),
        AppAction::counter_view_case(),
        |env: &AppEnvironment| env.counter.clone(),
    );
    let favorite_primes = FavoritePrimesReducer.pullback(
        AppState::favorite_primes_lens(),
        AppAction::favorite_primes_case(),
        |env: &AppEnvironment| env.favorites.clone(),
    );

    logging(counter_view.combine(favorite_primes))
}

/// Wrap `reducer` so every action and resulting state is logged at `debug`
pub const fn logging<R>(reducer: R) -> Logging<R> {
    Logging { reducer }
}

/// Reducer wrapper created by [`logging`]
#[derive(Debug, Clone)]
pub struct Logging<R> {
    reducer: R,
}

impl<R> Reducer for Logging<R>
where
    R: Reducer,
    R::State: fmt::Debug,
    R::Action: fmt::Debug,
{
    type State = R::State;
    type Action = R::Action;
    type Environment = R::Environment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let received = format!("{action:?}");
        let effects = self.reducer.reduce(state, action, env);
        tracing::debug!(action = %received, ?state, effects = effects.len(), "Reduced");
        effects
    }
}
