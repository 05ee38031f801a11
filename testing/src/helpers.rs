//! Driving effects outside a store

use futures::StreamExt;
use reducer_kit_core::Effect;

/// Drive one effect to completion and collect the actions it produces
///
/// Runs on a fresh current-thread runtime, so delays and timers work. Do not
/// call this from inside an async context; use [`collect_actions`] there.
///
/// Cancellation markers are inert: a `Cancellable` effect runs to completion
/// and `Cancel` yields nothing.
///
/// # Example
///
/// ```
/// use reducer_kit_core::Effect;
/// use reducer_kit_testing::run_effect;
///
/// let effect = Effect::from_fallible(async { "17".parse::<u64>() });
/// assert_eq!(run_effect(effect), vec![Some(17)]);
/// ```
pub fn run_effect<A: Send + 'static>(effect: Effect<A>) -> Vec<A> {
    tokio_test::block_on(collect_actions(effect))
}

/// Drive one effect to completion on the current runtime
pub async fn collect_actions<A: Send + 'static>(effect: Effect<A>) -> Vec<A> {
    effect.into_stream().collect().await
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG` and defaults to `debug`. Safe to call from every test;
/// only the first call installs anything.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
