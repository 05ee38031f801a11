//! # Reducer Kit Core
//!
//! Core traits and types for building unidirectional state machines.
//!
//! This crate provides the fundamental abstractions: reducers that mutate
//! state in place and describe side effects as values, and the operators that
//! compose small reducers into one reducer over a whole application.
//!
//! ## Vocabulary
//!
//! - **Reducer**: `(&mut State, Action, &Environment) -> effects`, with no I/O of its own
//! - **Effect**: a described piece of work that may produce more actions
//! - **Environment**: everything a reducer reaches outside itself for; tests pass doubles
//! - **Lens / `CasePath`**: focus app state and app actions on one feature
//! - **Pullback / Combine**: lift a feature reducer onto app types, and merge reducers
//!
//! The runtime that executes effects and serializes dispatch lives in
//! `reducer-kit-runtime`; nothing here spawns or blocks.
//!
//! ## Example
//!
//! ```
//! use reducer_kit_core::{CasePath, Effect, Lens, Reducer, ReducerExt, SmallVec};
//! use reducer_kit_core::reducer;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct AppState {
//!     count: i64,
//!     title: String,
//! }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum AppAction {
//!     Counter(CounterAction),
//!     Rename(String),
//! }
//!
//! let counter = reducer::from_fn(|count: &mut i64, action: CounterAction, _env: &()| {
//!     match action {
//!         CounterAction::Increment => *count += 1,
//!     }
//!     SmallVec::<[Effect<CounterAction>; 4]>::new()
//! });
//!
//! let app = counter.pullback(
//!     Lens::new(|s: &AppState| s.count, |s: &mut AppState, count| s.count = count),
//!     CasePath::new(
//!         |a: AppAction| match a {
//!             AppAction::Counter(action) => Some(action),
//!             AppAction::Rename(_) => None,
//!         },
//!         AppAction::Counter,
//!     ),
//!     |_env: &()| (),
//! );
//!
//! let mut state = AppState::default();
//! let effects = app.reduce(&mut state, AppAction::Counter(CounterAction::Increment), &());
//! assert_eq!(state.count, 1);
//! assert!(effects.is_empty());
//! ```

pub use smallvec::{SmallVec, smallvec};

/// Case paths - partial extraction and embedding between enum variants
pub mod case_path;

/// Reducer composition: pullback and combine
pub mod composition;

/// Effects as values
pub mod effect;

/// `async_effect!`, `sync_effect!` and `delay!`
pub mod effect_macros;

/// Lenses - bidirectional accessors between a state and a part of it
pub mod lens;

/// The [`Reducer`](reducer::Reducer) trait and closure-backed reducers
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`.
/// They mutate the state they are handed and describe everything else as
/// [`Effect`](crate::effect::Effect) values for the runtime to execute.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;
    use std::marker::PhantomData;

    /// A feature's state transitions
    ///
    /// # Contract
    ///
    /// - `state` is the only mutable data; it must not be retained past the call
    /// - Actions the reducer does not recognize are a no-op returning no effects
    /// - The reducer never blocks, sleeps or performs I/O; all of that is
    ///   returned as effects built from `env`
    ///
    /// # Example
    ///
    /// ```
    /// use reducer_kit_core::{Effect, Reducer, SmallVec};
    ///
    /// struct CounterReducer;
    ///
    /// enum CounterAction {
    ///     Increment,
    ///     Decrement,
    /// }
    ///
    /// impl Reducer for CounterReducer {
    ///     type State = i64;
    ///     type Action = CounterAction;
    ///     type Environment = ();
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut i64,
    ///         action: CounterAction,
    ///         _env: &(),
    ///     ) -> SmallVec<[Effect<CounterAction>; 4]> {
    ///         match action {
    ///             CounterAction::Increment => *state += 1,
    ///             CounterAction::Decrement => *state -= 1,
    ///         }
    ///         SmallVec::new()
    ///     }
    /// }
    ///
    /// let mut count = 0;
    /// let effects = CounterReducer.reduce(&mut count, CounterAction::Increment, &());
    /// assert_eq!(count, 1);
    /// assert!(effects.is_empty());
    /// ```
    pub trait Reducer {
        /// State owned by the feature
        type State;

        /// Every input the feature reacts to
        type Action;

        /// Dependencies effects are built from
        type Environment;

        /// Apply `action` to `state`; return the work to run afterwards, in order
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }

    impl<R> Reducer for Box<R>
    where
        R: Reducer + ?Sized,
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
            (**self).reduce(state, action, env)
        }
    }

    /// A reducer backed by a closure.
    ///
    /// Created by [`from_fn`].
    pub struct FnReducer<S, A, E, F> {
        f: F,
        _phantom: PhantomData<fn(&mut S, A, &E)>,
    }

    /// Build a reducer from a closure.
    ///
    /// Handy for small features where a dedicated struct and trait impl
    /// would be mostly ceremony.
    ///
    /// ```
    /// use reducer_kit_core::{reducer, Reducer, SmallVec};
    ///
    /// let doubler = reducer::from_fn(|state: &mut i32, _action: (), _env: &()| {
    ///     *state *= 2;
    ///     SmallVec::new()
    /// });
    ///
    /// let mut value = 21;
    /// let _ = doubler.reduce(&mut value, (), &());
    /// assert_eq!(value, 42);
    /// ```
    pub const fn from_fn<S, A, E, F>(f: F) -> FnReducer<S, A, E, F>
    where
        F: Fn(&mut S, A, &E) -> SmallVec<[Effect<A>; 4]>,
    {
        FnReducer {
            f,
            _phantom: PhantomData,
        }
    }

    impl<S, A, E, F> Reducer for FnReducer<S, A, E, F>
    where
        F: Fn(&mut S, A, &E) -> SmallVec<[Effect<A>; 4]>,
    {
        type State = S;
        type Action = A;
        type Environment = E;

        fn reduce(&self, state: &mut S, action: A, env: &E) -> SmallVec<[Effect<A>; 4]> {
            (self.f)(state, action, env)
        }
    }

    impl<S, A, E, F: Clone> Clone for FnReducer<S, A, E, F> {
        fn clone(&self) -> Self {
            Self {
                f: self.f.clone(),
                _phantom: PhantomData,
            }
        }
    }

    impl<S, A, E, F> std::fmt::Debug for FnReducer<S, A, E, F> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FnReducer").finish_non_exhaustive()
        }
    }
}

pub use case_path::CasePath;
pub use composition::{
    BoxedReducer, Combine, CombinedReducer, Pullback, ReducerExt, combine_reducers, pullback,
};
pub use effect::{EraseToEffect, Effect, EffectId};
pub use lens::Lens;
pub use reducer::Reducer;
