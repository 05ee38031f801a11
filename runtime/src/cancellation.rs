//! Bookkeeping for cancellable effects
//!
//! Every [`Effect::Cancellable`](reducer_kit_core::Effect::Cancellable) that
//! the store starts is registered under its id. An
//! [`Effect::Cancel`](reducer_kit_core::Effect::Cancel) aborts every live
//! registration with that id. A task nested in several cancellable effects
//! holds one registration per id. Finished effects remove themselves.

use futures::stream::{AbortHandle, AbortRegistration};
use reducer_kit_core::EffectId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Live abort handles, keyed by effect id
#[derive(Debug, Default)]
pub(crate) struct CancellationRegistry {
    next_token: AtomicU64,
    entries: Mutex<HashMap<EffectId, Vec<(u64, AbortHandle)>>>,
}

/// One registered effect, used to deregister it once it finishes
#[derive(Debug)]
pub(crate) struct Registration {
    pub(crate) id: EffectId,
    pub(crate) token: u64,
    pub(crate) handle: AbortHandle,
}

impl CancellationRegistry {
    /// Register a new cancellable effect under `id`
    pub(crate) fn register(&self, id: EffectId) -> (Registration, AbortRegistration) {
        let (handle, abort_registration) = AbortHandle::new_pair();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.clone())
            .or_default()
            .push((token, handle.clone()));

        (Registration { id, token, handle }, abort_registration)
    }

    /// Abort every live effect registered under `id`
    ///
    /// Returns the number of effects that were aborted.
    pub(crate) fn cancel(&self, id: &EffectId) -> usize {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .unwrap_or_default();

        for (_, handle) in &removed {
            handle.abort();
        }
        removed.len()
    }

    /// Drop a finished effect's registration
    pub(crate) fn complete(&self, registration: &Registration) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(live) = entries.get_mut(&registration.id) {
            live.retain(|(token, _)| *token != registration.token);
            if live.is_empty() {
                entries.remove(&registration.id);
            }
        }
    }

    /// Drop every registration of a finished task
    pub(crate) fn complete_all(&self, registrations: &[Registration]) {
        for registration in registrations {
            self.complete(registration);
        }
    }

    /// Number of live registrations under `id`
    #[cfg(test)]
    pub(crate) fn live(&self, id: &EffectId) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map_or(0, Vec::len)
    }
}
