//! # Prime Time
//!
//! A small app built from three independent features:
//!
//! - [`counter`]: step a number up and down, look up the n-th prime
//! - [`prime_modal`]: save or remove the current number as a favorite
//! - [`favorite_primes`]: edit, save and load the favorites
//!
//! Each feature owns a reducer over its own state and actions. [`app`]
//! lifts them onto the global [`AppState`](app::AppState) with pullbacks
//! and combines them into one reducer for the store.
//!
//! ## Example
//!
//! ```no_run
//! use prime_time::app::{AppAction, AppState, app_reducer};
//! use prime_time::counter::{CounterAction, CounterViewAction};
//! use prime_time::environment::AppEnvironment;
//! use reducer_kit_runtime::Store;
//!
//! # async fn example() -> Result<(), reducer_kit_runtime::StoreError> {
//! let store = Store::new(AppState::default(), app_reducer(), AppEnvironment::mock());
//!
//! let mut handle = store
//!     .send(AppAction::CounterView(CounterViewAction::Counter(CounterAction::NthPrimeButtonTapped)))
//!     .await?;
//! handle.wait().await;
//!
//! let alert = store.state(|s| s.alert_nth_prime).await;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod counter;
pub mod environment;
pub mod favorite_primes;
pub mod nth_prime;
pub mod prime_modal;
