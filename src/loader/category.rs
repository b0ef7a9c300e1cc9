use super::SourcePaths;
use crate::cache::CacheStore;
use crate::concurrency::InFlightMap;
use crate::error::LoadError;
use crate::transport::Transport;
use crate::types::{CategoryID, Fragment, Index};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Loaded-Category Table: category id to fragment, grows monotonically.
pub type LoadedTable = HashMap<CategoryID, Arc<Fragment>>;

type LoadResult = Result<Arc<Fragment>, LoadError>;

/// Per-category lifecycle as seen by the trigger and the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryState {
    Stub,
    Loading,
    Loaded,
    /// Sticky until an explicit retry succeeds.
    LoadFailed,
}

/// Loads category fragments from memory, the persistent cache, or the network.
///
/// Cheap to clone; all clones share one table and one in-flight map, so a
/// single instance per session is handed to every component that loads.
#[derive(Clone)]
pub struct CategoryLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    transport: Arc<dyn Transport>,
    cache: Arc<CacheStore>,
    paths: SourcePaths,
    index: RwLock<Option<Arc<Index>>>,
    loaded: RwLock<LoadedTable>,
    failed: RwLock<HashSet<CategoryID>>,
    in_flight: InFlightMap<CategoryID, LoadResult>,
}

impl CategoryLoader {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<CacheStore>, paths: SourcePaths) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                transport,
                cache,
                paths,
                index: RwLock::new(None),
                loaded: RwLock::new(HashMap::new()),
                failed: RwLock::new(HashSet::new()),
                in_flight: InFlightMap::new(),
            }),
        }
    }

    /// Install the session's index; category files are resolved against it.
    pub fn set_index(&self, index: Arc<Index>) {
        *self.inner.index.write() = Some(index);
    }

    /// The installed index, if any.
    pub fn index(&self) -> Option<Arc<Index>> {
        self.inner.index.read().clone()
    }

    /// Load one category.
    ///
    /// Order of resolution: Loaded-Category Table, a fetch already in flight,
    /// the persistent cache (when `use_cache`), then the network. Concurrent
    /// callers for the same id share a single fetch and its result.
    pub async fn load_category(&self, id: &str, use_cache: bool) -> LoadResult {
        if let Some(fragment) = self.get(id) {
            return Ok(fragment);
        }

        let key = id.to_string();
        if use_cache && !self.inner.in_flight.contains(&key) {
            if let Some(fragment) = self.inner.cache.get_category(id) {
                debug!(category_id = id, "Category served from persistent cache");
                return Ok(self.inner.store_loaded(id, fragment));
            }
        }

        let path = self.resolve_path(id)?;
        let inner = Arc::clone(&self.inner);
        let owned_id = key.clone();
        let (shared, started) = self
            .inner
            .in_flight
            .join_or_start(&key, move || inner.fetch_fragment(owned_id, path));
        if !started {
            debug!(category_id = id, "Joining in-flight category load");
        }
        shared.await
    }

    /// Fragment from the Loaded-Category Table, without any I/O.
    pub fn get(&self, id: &str) -> Option<Arc<Fragment>> {
        self.inner.loaded.read().get(id).cloned()
    }

    /// True once `id` is in the Loaded-Category Table.
    pub fn is_loaded(&self, id: &str) -> bool {
        self.inner.loaded.read().contains_key(id)
    }

    /// True while a fetch for `id` is running.
    pub fn is_in_flight(&self, id: &str) -> bool {
        self.inner.in_flight.contains(&id.to_string())
    }

    /// Lifecycle state of `id`. Loaded beats in flight, which beats failed.
    pub fn state(&self, id: &str) -> CategoryState {
        if self.is_loaded(id) {
            CategoryState::Loaded
        } else if self.is_in_flight(id) {
            CategoryState::Loading
        } else if self.inner.failed.read().contains(id) {
            CategoryState::LoadFailed
        } else {
            CategoryState::Stub
        }
    }

    /// Copy of the Loaded-Category Table for merging.
    pub fn snapshot(&self) -> LoadedTable {
        self.inner.loaded.read().clone()
    }

    /// Ids whose last load attempt failed and that have not loaded since.
    pub fn failed_ids(&self) -> HashSet<CategoryID> {
        self.inner.failed.read().clone()
    }

    pub fn loaded_count(&self) -> usize {
        self.inner.loaded.read().len()
    }

    /// Persistent cache backing this loader.
    pub fn cache(&self) -> &CacheStore {
        &self.inner.cache
    }

    fn resolve_path(&self, id: &str) -> Result<String, LoadError> {
        let index = self.inner.index.read();
        let category = index
            .as_ref()
            .and_then(|index| index.find(id))
            .ok_or_else(|| LoadError::UnknownCategory(id.to_string()))?;
        Ok(self.inner.paths.fragment_path(&category.file))
    }
}

impl LoaderInner {
    async fn fetch_fragment(self: Arc<Self>, id: CategoryID, path: String) -> LoadResult {
        info!(category_id = %id, path = %path, "Loading category");

        match self.fetch_and_decode(&id, &path).await {
            Ok(fragment) => {
                self.cache.set_category(&id, &fragment);
                let fragment = self.store_loaded(&id, fragment);
                info!(
                    category_id = %id,
                    items = fragment.item_count(),
                    "Category loaded"
                );
                Ok(fragment)
            }
            Err(e) => {
                self.failed.write().insert(id.clone());
                warn!(category_id = %id, error = %e, "Category load failed");
                Err(e)
            }
        }
    }

    async fn fetch_and_decode(&self, id: &str, path: &str) -> Result<Fragment, LoadError> {
        let failed = |reason: String| LoadError::CategoryFetchFailed {
            id: id.to_string(),
            reason,
        };

        let body = self
            .transport
            .fetch(path)
            .await
            .map_err(|e| failed(e.to_string()))?;
        let fragment: Fragment = serde_json::from_slice(&body)
            .map_err(|e| failed(format!("malformed fragment {}: {}", path, e)))?;
        if fragment.id != id {
            return Err(failed(format!(
                "fragment {} declares id '{}'",
                path, fragment.id
            )));
        }
        Ok(fragment)
    }

    /// Insert into the table (first writer wins) and clear any sticky failure.
    fn store_loaded(&self, id: &str, fragment: Fragment) -> Arc<Fragment> {
        let stored = {
            let mut loaded = self.loaded.write();
            Arc::clone(
                loaded
                    .entry(id.to_string())
                    .or_insert_with(|| Arc::new(fragment)),
            )
        };
        self.failed.write().remove(id);
        stored
    }
}
