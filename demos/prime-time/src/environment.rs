//! Application environment
//!
//! Built once at start-up and handed to the store. Features only ever see
//! their own slice of it.

use crate::config::PrimeTimeConfig;
use crate::counter::CounterEnvironment;
use crate::favorite_primes::FavoritePrimesEnvironment;
use crate::nth_prime::WolframAlphaClient;

/// Every dependency the app needs
#[derive(Debug, Clone)]
pub struct AppEnvironment {
    /// Counter dependencies
    pub counter: CounterEnvironment,
    /// Favorites dependencies
    pub favorites: FavoritePrimesEnvironment,
}

impl AppEnvironment {
    /// Live lookups against Wolfram|Alpha, in-memory favorites
    #[must_use]
    pub fn live(config: &PrimeTimeConfig) -> Self {
        let client = WolframAlphaClient::new(config);
        Self {
            counter: CounterEnvironment::new(move |n| client.nth_prime_effect(n)),
            favorites: FavoritePrimesEnvironment::in_memory(),
        }
    }

    /// No network: every lookup answers 17
    #[must_use]
    pub fn mock() -> Self {
        Self {
            counter: CounterEnvironment::mock(),
            favorites: FavoritePrimesEnvironment::in_memory(),
        }
    }

    /// Replace the counter's lookup
    #[must_use]
    pub fn with_counter(mut self, counter: CounterEnvironment) -> Self {
        self.counter = counter;
        self
    }

    /// Replace the favorites storage
    #[must_use]
    pub fn with_favorites(mut self, favorites: FavoritePrimesEnvironment) -> Self {
        self.favorites = favorites;
        self
    }
}
