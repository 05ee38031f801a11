//! Prime modal feature
//!
//! The modal shown for the current count: it tells whether the count is
//! prime and lets the user add it to, or remove it from, the favorites.

use reducer_kit_core::{Effect, Reducer, SmallVec};

/// State the modal reads and writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimeModalState {
    /// The number being inspected
    pub count: i64,
    /// Saved favorites, in insertion order
    pub favorite_primes: Vec<i64>,
}

impl PrimeModalState {
    /// Whether `count` is already a favorite
    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.favorite_primes.contains(&self.count)
    }
}

/// Modal actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimeModalAction {
    /// Append `count` to the favorites
    SaveFavoritePrimeTapped,
    /// Remove every occurrence of `count` from the favorites
    RemoveFavoritePrimeTapped,
}

/// Reducer for the modal; needs no environment
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimeModalReducer;

impl Reducer for PrimeModalReducer {
    type State = PrimeModalState;
    type Action = PrimeModalAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            PrimeModalAction::SaveFavoritePrimeTapped => {
                state.favorite_primes.push(state.count);
            },
            PrimeModalAction::RemoveFavoritePrimeTapped => {
                let count = state.count;
                state.favorite_primes.retain(|prime| *prime != count);
            },
        }

        SmallVec::new()
    }
}

/// Trial division primality check
#[must_use]
pub fn is_prime(n: i64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }

    (2_i64..)
        .take_while(|d| d.checked_mul(*d).is_some_and(|square| square <= n))
        .all(|d| n % d != 0)
}
