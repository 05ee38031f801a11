//! Prime Time binary
//!
//! Runs a scripted session against the store and prints the state after
//! each step. Uses live Wolfram|Alpha lookups when `WOLFRAM_ALPHA_APP_ID`
//! is set, a canned answer otherwise. With `PRIME_TIME_METRICS=1` the
//! store's Prometheus metrics are printed at the end.

use prime_time::app::{AppAction, AppState, app_reducer};
use prime_time::config::{ConfigError, PrimeTimeConfig};
use prime_time::counter::{CounterAction, CounterViewAction, ordinal};
use prime_time::environment::AppEnvironment;
use prime_time::favorite_primes::FavoritePrimesAction;
use prime_time::prime_modal::{PrimeModalAction, is_prime};
use reducer_kit_runtime::Store;
use reducer_kit_runtime::metrics::PrometheusRecorder;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prime_time=debug,reducer_kit_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let recorder = if std::env::var_os("PRIME_TIME_METRICS").is_some() {
        Some(PrometheusRecorder::install()?)
    } else {
        None
    };

    let environment = match PrimeTimeConfig::from_env() {
        Ok(config) => {
            tracing::info!(base_url = %config.base_url, "Using live Wolfram|Alpha lookups");
            AppEnvironment::live(&config)
        },
        Err(ConfigError::MissingAppId) => {
            tracing::warn!("WOLFRAM_ALPHA_APP_ID not set, using canned lookups");
            AppEnvironment::mock()
        },
        Err(error) => return Err(error.into()),
    };

    let store = Store::new(AppState::default(), app_reducer(), environment);

    println!("=== Prime Time ===\n");

    for _ in 0..7 {
        store.send(counter(CounterAction::Increment)).await?;
    }
    let count = store.state(|s| s.count).await;
    println!("Count: {count} (prime: {})", is_prime(count));

    store.send(modal(PrimeModalAction::SaveFavoritePrimeTapped)).await?;
    println!("Favorites: {:?}", store.state(|s| s.favorite_primes.clone()).await);

    println!("\n>>> Asking for the {} prime", ordinal(count));
    let mut lookup = store.send(counter(CounterAction::NthPrimeButtonTapped)).await?;
    println!("Button disabled: {}", store.state(|s| s.is_nth_prime_button_disabled).await);

    if lookup.wait_with_timeout(LOOKUP_TIMEOUT).await.is_err() {
        println!("Lookup still running after {LOOKUP_TIMEOUT:?}");
    }
    match store.state(|s| s.alert_nth_prime).await {
        Some(alert) => println!("{}", alert.title(count)),
        None => println!("No answer"),
    }
    store.send(counter(CounterAction::AlertDismissButtonTapped)).await?;

    println!("\n>>> Saving and reloading favorites");
    let mut save = store.send(AppAction::FavoritePrimes(FavoritePrimesAction::SaveButtonTapped)).await?;
    save.wait().await;
    store
        .send(AppAction::FavoritePrimes(FavoritePrimesAction::DeleteFavoritePrimes([0].into())))
        .await?;
    println!("After delete: {:?}", store.state(|s| s.favorite_primes.clone()).await);

    let mut load = store.send(AppAction::FavoritePrimes(FavoritePrimesAction::LoadButtonTapped)).await?;
    load.wait().await;
    println!("After load: {:?}", store.state(|s| s.favorite_primes.clone()).await);

    store.shutdown(Duration::from_secs(5)).await?;

    println!("\nFinal state: {:#?}", store.current_state().await);
    if let Some(scrape) = recorder.as_ref().and_then(PrometheusRecorder::render) {
        println!("\n{scrape}");
    }
    Ok(())
}

fn counter(action: CounterAction) -> AppAction {
    AppAction::CounterView(CounterViewAction::Counter(action))
}

fn modal(action: PrimeModalAction) -> AppAction {
    AppAction::CounterView(CounterViewAction::PrimeModal(action))
}
