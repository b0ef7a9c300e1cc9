//! Single-flight request coalescing
//!
//! Keyed registry of in-flight futures. The first caller for a key starts the
//! work; every concurrent caller for the same key awaits the same shared
//! future and observes the same result. Entries are removed once the work
//! settles so a later call (e.g. a retry after failure) starts fresh.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

/// Shared handle on an in-flight computation.
pub type InFlight<V> = Shared<BoxFuture<'static, V>>;

pub struct InFlightMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: Arc<Mutex<HashMap<K, InFlight<V>>>>,
}

impl<K, V> InFlightMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join the in-flight work for `key`, or start it with `make`.
    ///
    /// Returns the shared future and whether this call started it. The entry
    /// removes itself from the map when the work settles.
    pub fn join_or_start<F, Fut>(&self, key: &K, make: F) -> (InFlight<V>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let mut map = self.entries.lock();
        if let Some(existing) = map.get(key) {
            return (existing.clone(), false);
        }

        let work = make();
        let entries = Arc::clone(&self.entries);
        let owned_key = key.clone();
        let shared = async move {
            let value = work.await;
            entries.lock().remove(&owned_key);
            value
        }
        .boxed()
        .shared();

        map.insert(key.clone(), shared.clone());
        (shared, true)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<K, V> Default for InFlightMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
