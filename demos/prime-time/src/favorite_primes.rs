//! Favorite primes feature
//!
//! The list of saved primes: delete entries, and save or load the whole
//! list through an injected [`FavoritesStorage`].

use reducer_kit_core::{Effect, Reducer, SmallVec, smallvec};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Favorite primes actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritePrimesAction {
    /// Remove the entries at these positions
    DeleteFavoritePrimes(BTreeSet<usize>),
    /// Replace the list with a loaded one
    LoadedFavoritePrimes(Vec<i64>),
    /// Read the saved list from storage
    LoadButtonTapped,
    /// Write the current list to storage
    SaveButtonTapped,
}

/// Where the favorites are saved
pub trait FavoritesStorage: Send + Sync {
    /// The saved list, or `None` if nothing was saved yet
    fn load(&self) -> Option<Vec<i64>>;

    /// Replace the saved list
    fn save(&self, primes: &[i64]);
}

/// Storage that lives as long as the process
#[derive(Debug, Default)]
pub struct InMemoryFavorites {
    saved: Mutex<Option<Vec<i64>>>,
}

impl InMemoryFavorites {
    /// Storage that already holds `primes`
    #[must_use]
    pub const fn with_saved(primes: Vec<i64>) -> Self {
        Self {
            saved: Mutex::new(Some(primes)),
        }
    }
}

impl FavoritesStorage for InMemoryFavorites {
    fn load(&self) -> Option<Vec<i64>> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn save(&self, primes: &[i64]) {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(primes.to_vec());
    }
}

/// Favorite primes dependencies
#[derive(Clone)]
pub struct FavoritePrimesEnvironment {
    storage: Arc<dyn FavoritesStorage>,
}

impl FavoritePrimesEnvironment {
    /// Environment backed by `storage`
    #[must_use]
    pub fn new(storage: Arc<dyn FavoritesStorage>) -> Self {
        Self { storage }
    }

    /// Environment with empty in-memory storage
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryFavorites::default()))
    }

    /// The backing storage
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn FavoritesStorage> {
        &self.storage
    }
}

impl fmt::Debug for FavoritePrimesEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FavoritePrimesEnvironment").finish_non_exhaustive()
    }
}

/// Reducer over the favorites list
#[derive(Debug, Clone, Copy, Default)]
pub struct FavoritePrimesReducer;

impl Reducer for FavoritePrimesReducer {
    type State = Vec<i64>;
    type Action = FavoritePrimesAction;
    type Environment = FavoritePrimesEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FavoritePrimesAction::DeleteFavoritePrimes(indices) => {
                // Highest first, so earlier removals don't shift later ones
                for index in indices.into_iter().rev() {
                    if index < state.len() {
                        state.remove(index);
                    }
                }
                SmallVec::new()
            },
            FavoritePrimesAction::LoadedFavoritePrimes(primes) => {
                *state = primes;
                SmallVec::new()
            },
            FavoritePrimesAction::LoadButtonTapped => {
                let storage = Arc::clone(&env.storage);
                smallvec![Effect::future(async move {
                    storage.load().map(FavoritePrimesAction::LoadedFavoritePrimes)
                })]
            },
            FavoritePrimesAction::SaveButtonTapped => {
                let storage = Arc::clone(&env.storage);
                let primes = state.clone();
                smallvec![Effect::future(async move {
                    storage.save(&primes);
                    None
                })]
            },
        }
    }
}
