//! # Reducer Kit Runtime
//!
//! The [`Store`] turns a reducer tree into a running program:
//!
//! - **Serial dispatch**: every action, whether sent by a caller or produced
//!   by an effect, is reduced under one write lock, one at a time
//! - **Effect execution**: effects returned by the reducer run on spawned
//!   tasks and feed their actions back through [`Store::send`]
//! - **Cancellation**: `Effect::Cancellable` effects are aborted by a later
//!   `Effect::Cancel` with the same id
//! - **Observation**: effect-produced actions are broadcast to subscribers
//!
//! ## Example
//!
//! ```
//! use reducer_kit_core::{Effect, SmallVec, reducer, smallvec};
//! use reducer_kit_runtime::Store;
//!
//! #[derive(Clone, Debug)]
//! enum Action {
//!     Increment,
//!     IncrementLater,
//! }
//!
//! # tokio_test::block_on(async {
//! let counter = reducer::from_fn(|count: &mut i64, action: Action, _env: &()| match action {
//!     Action::Increment => {
//!         *count += 1;
//!         SmallVec::new()
//!     },
//!     Action::IncrementLater => smallvec![Effect::sync(|| Action::Increment)],
//! });
//!
//! let store = Store::new(0, counter, ());
//! let mut handle = store.send(Action::IncrementLater).await?;
//! handle.wait().await;
//!
//! assert_eq!(store.state(|count| *count).await, 1);
//! # Ok::<(), reducer_kit_runtime::StoreError>(())
//! # }).unwrap();
//! ```

mod cancellation;

/// Store configuration
pub mod config;

/// Error types for the Store runtime
pub mod error;

/// Effect completion tracking
pub mod handle;

/// Prometheus metrics for observability
pub mod metrics;

/// The Store and its effect executor
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use handle::{EffectHandle, TrackingMode};
pub use store::Store;
