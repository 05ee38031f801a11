//! # Reducer Kit Testing
//!
//! Testing utilities for reducers, effects and stores.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then checks for a single reduction
//! - [`assert_steps`]: scripted send/receive steps with expected state updates
//! - [`TestStore`]: the same exhaustive flow, driven from async tests
//! - [`run_effect`] / [`collect_actions`]: drive an effect outside a store
//! - [`properties`]: lens and case path law checks for proptest
//!
//! ## Example
//!
//! ```
//! use reducer_kit_core::{Effect, SmallVec, reducer};
//! use reducer_kit_testing::{Step, assert_steps};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum CounterAction {
//!     Incr,
//!     Decr,
//! }
//!
//! let counter = reducer::from_fn(|count: &mut i64, action: CounterAction, _env: &()| {
//!     match action {
//!         CounterAction::Incr => *count += 1,
//!         CounterAction::Decr => *count -= 1,
//!     }
//!     SmallVec::<[Effect<CounterAction>; 4]>::new()
//! });
//!
//! assert_steps(
//!     2,
//!     &counter,
//!     &(),
//!     vec![
//!         Step::send(CounterAction::Incr, |count| *count = 3),
//!         Step::send(CounterAction::Incr, |count| *count = 4),
//!         Step::send(CounterAction::Decr, |count| *count = 3),
//!     ],
//! );
//! ```

pub mod helpers;
pub mod properties;
pub mod steps;
pub mod test_store;

pub use helpers::{collect_actions, init_tracing, run_effect};
pub use reducer_test::{ReducerTest, assertions};
pub use steps::{Step, StepKind, assert_steps};
pub use test_store::TestStore;
