//! Building one root reducer out of feature reducers
//!
//! [`pullback`] moves a feature reducer from its own state, action and
//! environment onto the app's; [`combine_reducers`] (or
//! [`ReducerExt::combine`]) runs several reducers over the same app types.
//! Features never name each other or the app types; the wiring is done
//! once, where the root reducer is built.
//!
//! ```
//! use reducer_kit_core::{Effect, Reducer, SmallVec, reducer};
//! use reducer_kit_core::composition::combine_reducers;
//!
//! #[derive(Default)]
//! struct Scoreboard {
//!     points: u32,
//!     log: Vec<String>,
//! }
//!
//! #[derive(Clone)]
//! enum Play {
//!     Goal,
//!     Note(String),
//! }
//!
//! let scoring = reducer::from_fn(|board: &mut Scoreboard, play: Play, _env: &()| {
//!     if let Play::Goal = play {
//!         board.points += 1;
//!     }
//!     SmallVec::<[Effect<Play>; 4]>::new()
//! });
//! let logging = reducer::from_fn(|board: &mut Scoreboard, play: Play, _env: &()| {
//!     board.log.push(match play {
//!         Play::Goal => format!("goal, now {}", board.points),
//!         Play::Note(text) => text,
//!     });
//!     SmallVec::<[Effect<Play>; 4]>::new()
//! });
//!
//! let both = combine_reducers(vec![Box::new(scoring), Box::new(logging)]);
//! let mut board = Scoreboard::default();
//! let _ = both.reduce(&mut board, Play::Goal, &());
//! assert_eq!(board.log, ["goal, now 1"]);
//! ```

use crate::case_path::CasePath;
use crate::effect::{EraseToEffect, Effect};
use crate::lens::Lens;
use crate::reducer::Reducer;
use smallvec::SmallVec;
use std::marker::PhantomData;

/// A type-erased reducer, as accepted by [`combine_reducers`]
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Reducers run in the order given, against the same incoming action and
/// one shared mutable state: each reducer observes the mutations made by
/// the ones before it. Effects are concatenated in invocation order.
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The action type
/// - `E`: The environment type
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    A: Clone,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E> {
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E> {
    /// Number of reducers in this combination
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether no reducers were combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    A: Clone,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

impl<S, A, E> std::fmt::Debug for CombinedReducer<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("reducers", &self.reducers.len())
            .finish()
    }
}

/// Two reducers run back to back, without boxing.
///
/// Created by [`ReducerExt::combine`]. Same ordering rules as
/// [`combine_reducers`]: `first` runs, then `second` sees its mutations.
#[derive(Debug, Clone)]
pub struct Combine<R1, R2> {
    first: R1,
    second: R2,
}

impl<R1, R2> Reducer for Combine<R1, R2>
where
    R1: Reducer,
    R1::Action: Clone,
    R2: Reducer<State = R1::State, Action = R1::Action, Environment = R1::Environment>,
{
    type State = R1::State;
    type Action = R1::Action;
    type Environment = R1::Environment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut effects = self.first.reduce(state, action.clone(), env);
        effects.extend(self.second.reduce(state, action, env));
        effects
    }
}

/// Lifts a reducer over local types into one over global types.
///
/// # Behaviour
///
/// 1. The global action goes through `action.extract`. If it yields `None`
///    the global state is left untouched and no effects are returned.
/// 2. Otherwise the local state is read through `state.get` and the local
///    reducer runs with the extracted action and `environment(global_env)`.
/// 3. The local state is always written back through `state.set`, since
///    the getter may have produced a projection rather than an alias.
/// 4. Every returned effect has its actions embedded back into the global
///    action type with `action.embed`, preserving effect order.
///
/// # Example
///
/// ```
/// use reducer_kit_core::{CasePath, Effect, Lens, Reducer, SmallVec, pullback};
/// use reducer_kit_core::reducer;
///
/// #[derive(Debug, Default)]
/// struct AppState {
///     count: i64,
///     other: String,
/// }
///
/// #[derive(Clone, Debug)]
/// enum AppAction {
///     Add(i64),
///     Rename(String),
/// }
///
/// let add = reducer::from_fn(|count: &mut i64, n: i64, _env: &()| {
///     *count += n;
///     SmallVec::<[Effect<i64>; 4]>::new()
/// });
///
/// let app = pullback(
///     add,
///     Lens::new(|s: &AppState| s.count, |s: &mut AppState, v| s.count = v),
///     CasePath::new(
///         |a: AppAction| match a {
///             AppAction::Add(n) => Some(n),
///             AppAction::Rename(_) => None,
///         },
///         AppAction::Add,
///     ),
///     |_env: &()| (),
/// );
///
/// let mut state = AppState::default();
/// let _ = app.reduce(&mut state, AppAction::Add(3), &());
/// let effects = app.reduce(&mut state, AppAction::Rename("ignored".into()), &());
///
/// assert_eq!(state.count, 3);
/// assert_eq!(state.other, "");
/// assert!(effects.is_empty());
/// ```
pub fn pullback<R, GS, GA, GE, F>(
    reducer: R,
    state: Lens<GS, R::State>,
    action: CasePath<GA, R::Action>,
    environment: F,
) -> Pullback<R, GS, GA, GE, F>
where
    R: Reducer,
    F: Fn(&GE) -> R::Environment,
{
    Pullback {
        reducer,
        state,
        action,
        environment,
        _phantom: PhantomData,
    }
}

/// A reducer lifted to global types.
///
/// Created by [`pullback`].
pub struct Pullback<R, GS, GA, GE, F>
where
    R: Reducer,
{
    reducer: R,
    state: Lens<GS, R::State>,
    action: CasePath<GA, R::Action>,
    environment: F,
    _phantom: PhantomData<fn(&GE)>,
}

impl<R, GS, GA, GE, F> Reducer for Pullback<R, GS, GA, GE, F>
where
    R: Reducer,
    R::Action: Send + 'static,
    GA: Send + 'static,
    F: Fn(&GE) -> R::Environment,
{
    type State = GS;
    type Action = GA;
    type Environment = GE;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(local_action) = self.action.extract(action) else {
            return SmallVec::new();
        };

        let mut local_state = self.state.get(state);
        let local_env = (self.environment)(env);
        let effects = self.reducer.reduce(&mut local_state, local_action, &local_env);
        self.state.set(state, local_state);

        effects
            .into_iter()
            .map(|effect| effect.map(self.action.embedder()).erase_to_effect())
            .collect()
    }
}

impl<R, GS, GA, GE, F> Clone for Pullback<R, GS, GA, GE, F>
where
    R: Reducer + Clone,
    F: Clone,
{
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            state: self.state.clone(),
            action: self.action.clone(),
            environment: self.environment.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<R, GS, GA, GE, F> std::fmt::Debug for Pullback<R, GS, GA, GE, F>
where
    R: Reducer + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pullback")
            .field("reducer", &self.reducer)
            .field("state", &self.state)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// Method-style composition for any [`Reducer`]
pub trait ReducerExt: Reducer + Sized {
    /// See [`pullback`]
    fn pullback<GS, GA, GE, F>(
        self,
        state: Lens<GS, Self::State>,
        action: CasePath<GA, Self::Action>,
        environment: F,
    ) -> Pullback<Self, GS, GA, GE, F>
    where
        F: Fn(&GE) -> Self::Environment,
    {
        pullback(self, state, action, environment)
    }

    /// Run `self`, then `other`, on every action
    fn combine<R>(self, other: R) -> Combine<Self, R>
    where
        R: Reducer<State = Self::State, Action = Self::Action, Environment = Self::Environment>,
    {
        Combine {
            first: self,
            second: other,
        }
    }

    /// Erase the concrete reducer type
    fn boxed(self) -> BoxedReducer<Self::State, Self::Action, Self::Environment>
    where
        Self: Send + Sync + 'static,
    {
        Box::new(self)
    }
}

impl<R: Reducer> ReducerExt for R {}
