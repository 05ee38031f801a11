//! End-to-end flows through the composed app
//!
//! Reducer-level flows use `TestStore`; store-level flows run the real
//! dispatch loop with mock or unreachable lookups.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use prime_time::app::{AppAction, AppState, app_reducer};
use prime_time::config::PrimeTimeConfig;
use prime_time::counter::{
    CounterAction, CounterEnvironment, CounterViewAction, CounterViewState, PrimeAlert, counter_view_reducer,
};
use prime_time::environment::AppEnvironment;
use prime_time::favorite_primes::FavoritePrimesAction;
use prime_time::prime_modal::PrimeModalAction;
use reducer_kit_core::Effect;
use reducer_kit_runtime::Store;
use reducer_kit_testing::TestStore;
use std::time::Duration;

fn counter(action: CounterAction) -> CounterViewAction {
    CounterViewAction::Counter(action)
}

fn app_counter(action: CounterAction) -> AppAction {
    AppAction::CounterView(counter(action))
}

fn favorites(action: FavoritePrimesAction) -> AppAction {
    AppAction::FavoritePrimes(action)
}

fn state_with_favorites() -> CounterViewState {
    CounterViewState {
        alert_nth_prime: None,
        count: 2,
        favorite_primes: vec![3, 5],
        is_nth_prime_button_disabled: false,
    }
}

// ============================================================================
// Reducer-level flows
// ============================================================================

#[tokio::test]
async fn test_nth_prime_happy_flow() {
    let env = CounterEnvironment::new(|_| Effect::sync(|| Some(17)));
    let mut store = TestStore::new(CounterViewState::default(), counter_view_reducer(), env);

    store
        .send(counter(CounterAction::NthPrimeButtonTapped), |s| {
            s.is_nth_prime_button_disabled = true;
        })
        .await;
    store
        .receive(counter(CounterAction::NthPrimeResponse(Some(17))), |s| {
            s.is_nth_prime_button_disabled = false;
            s.alert_nth_prime = Some(PrimeAlert { prime: 17 });
        })
        .await;
    store
        .send(counter(CounterAction::AlertDismissButtonTapped), |s| {
            s.alert_nth_prime = None;
        })
        .await;
    store.finish();
}

#[tokio::test]
async fn test_nth_prime_unhappy_flow() {
    let env = CounterEnvironment::new(|_| Effect::sync(|| None));
    let mut store = TestStore::new(state_with_favorites(), counter_view_reducer(), env);

    store
        .send(counter(CounterAction::NthPrimeButtonTapped), |s| {
            s.is_nth_prime_button_disabled = true;
        })
        .await;
    store
        .receive(counter(CounterAction::NthPrimeResponse(None)), |s| {
            s.is_nth_prime_button_disabled = false;
        })
        .await;
    store.finish();

    assert_eq!(store.state(), &state_with_favorites());
}

#[tokio::test]
async fn test_prime_modal_save_and_remove() {
    let mut store = TestStore::new(state_with_favorites(), counter_view_reducer(), CounterEnvironment::mock());

    store
        .send(CounterViewAction::PrimeModal(PrimeModalAction::SaveFavoritePrimeTapped), |s| {
            s.favorite_primes = vec![3, 5, 2];
        })
        .await;
    store
        .send(CounterViewAction::PrimeModal(PrimeModalAction::RemoveFavoritePrimeTapped), |s| {
            s.favorite_primes = vec![3, 5];
        })
        .await;
    store.finish();
}

#[tokio::test]
async fn test_favorites_save_delete_load() {
    let mut store = TestStore::new(
        AppState {
            favorite_primes: vec![2, 3, 5],
            ..AppState::default()
        },
        app_reducer(),
        AppEnvironment::mock(),
    );

    store.send(favorites(FavoritePrimesAction::SaveButtonTapped), |_| {}).await;
    store
        .send(favorites(FavoritePrimesAction::DeleteFavoritePrimes([0, 2].into())), |s| {
            s.favorite_primes = vec![3];
        })
        .await;
    store.send(favorites(FavoritePrimesAction::LoadButtonTapped), |_| {}).await;
    store
        .receive(favorites(FavoritePrimesAction::LoadedFavoritePrimes(vec![2, 3, 5])), |s| {
            s.favorite_primes = vec![2, 3, 5];
        })
        .await;
    store.finish();
}

// ============================================================================
// Store-level flows
// ============================================================================

#[tokio::test]
async fn test_store_runs_lookup_and_feeds_response_back() {
    let store = Store::new(AppState::default(), app_reducer(), AppEnvironment::mock());

    let mut handle = store.send(app_counter(CounterAction::NthPrimeButtonTapped)).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

    let state = store.current_state().await;
    assert_eq!(state.alert_nth_prime, Some(PrimeAlert { prime: 17 }));
    assert!(!state.is_nth_prime_button_disabled);
}

#[tokio::test]
async fn test_store_request_response() {
    let store = Store::new(
        AppState {
            count: 4,
            ..AppState::default()
        },
        app_reducer(),
        AppEnvironment::mock().with_counter(CounterEnvironment::new(|n| {
            Effect::future(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Some(Some(if n == 4 { 7 } else { 0 }))
            })
        })),
    );

    let response = store
        .send_and_wait_for(
            app_counter(CounterAction::NthPrimeButtonTapped),
            |action| matches!(action, AppAction::CounterView(CounterViewAction::Counter(CounterAction::NthPrimeResponse(_)))),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(response, app_counter(CounterAction::NthPrimeResponse(Some(7))));
}

#[tokio::test]
async fn test_button_disabled_until_response_arrives() {
    let store = Store::new(
        AppState::default(),
        app_reducer(),
        AppEnvironment::mock().with_counter(CounterEnvironment::new(|_| Effect::delay(Duration::from_millis(50), Some(2)))),
    );

    let mut handle = store.send(app_counter(CounterAction::NthPrimeButtonTapped)).await.unwrap();
    assert!(store.state(|s| s.is_nth_prime_button_disabled).await);

    handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
    assert!(!store.state(|s| s.is_nth_prime_button_disabled).await);
}

#[tokio::test]
async fn test_unreachable_api_yields_no_alert() {
    let config = PrimeTimeConfig::new("demo").with_base_url("http://127.0.0.1:9/v2/query");
    let store = Store::new(AppState::default(), app_reducer(), AppEnvironment::live(&config));

    let mut handle = store.send(app_counter(CounterAction::NthPrimeButtonTapped)).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let state = store.current_state().await;
    assert_eq!(state.alert_nth_prime, None);
    assert!(!state.is_nth_prime_button_disabled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_are_serialized() {
    let store = Store::new(AppState::default(), app_reducer(), AppEnvironment::mock());

    let tasks: Vec<_> = (0..100)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let action = if i % 4 == 0 {
                    AppAction::CounterView(CounterViewAction::PrimeModal(PrimeModalAction::SaveFavoritePrimeTapped))
                } else {
                    app_counter(CounterAction::Increment)
                };
                store.send(action).await.unwrap();
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("task panicked");
    }

    let state = store.current_state().await;
    assert_eq!(state.count, 75);
    assert_eq!(state.favorite_primes.len(), 25);
}
