//! Persistent Fragment Cache
//!
//! Version- and expiry-aware wrapper over a durable key-value area. Entries are
//! stored as JSON `{data, timestamp, version}`. Nothing here raises past the
//! store boundary: unreadable entries are misses and rejected writes are logged
//! and dropped.

mod sled_store;
mod storage;

pub use sled_store::SledStorage;
pub use storage::{CacheStorage, DisabledStorage, MemoryStorage};

use crate::error::{ErrorKind, StorageError};
use crate::types::Fragment;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Schema version written with every entry unless configured otherwise.
pub const CURRENT_VERSION: &str = "1.0.0";

/// Key namespace for fragment entries.
pub const DEFAULT_NAMESPACE: &str = "tg_nav_category";

/// Entries older than this are treated as absent.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Millisecond wall clock used to stamp and age entries.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Stored form of a cached fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Fragment,
    /// Epoch milliseconds at write time.
    pub timestamp: i64,
    pub version: String,
}

/// Namespace, schema version and TTL for a cache store.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub namespace: String,
    pub version: String,
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: DEFAULT_NAMESPACE.to_string(),
            version: CURRENT_VERSION.to_string(),
            ttl: DEFAULT_TTL,
        }
    }
}

/// Summary of one stored entry, for maintenance tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryInspection {
    pub key: String,
    pub version: String,
    pub age: Duration,
    pub item_count: usize,
    pub valid: bool,
}

/// Why a stored entry was rejected on read.
#[derive(Debug)]
enum Rejection {
    Decode(serde_json::Error),
    VersionMismatch(String),
    Expired(i64),
}

impl Rejection {
    /// Error kind for rejections caused by unreadable data. Stale entries have none.
    fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Rejection::Decode(_) => Some(ErrorKind::CacheDecodeError),
            Rejection::VersionMismatch(_) | Rejection::Expired(_) => None,
        }
    }
}

pub struct CacheStore {
    storage: Arc<dyn CacheStorage>,
    settings: CacheSettings,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new(storage: Arc<dyn CacheStorage>, settings: CacheSettings) -> Self {
        Self::with_clock(storage, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        storage: Arc<dyn CacheStorage>,
        settings: CacheSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            settings,
            clock,
        }
    }

    /// In-memory store with default settings.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), CacheSettings::default())
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// `<namespace>_<categoryId>_<version>`; a version bump orphans old keys.
    pub fn key_for(&self, category_id: &str) -> String {
        format!(
            "{}_{}_{}",
            self.settings.namespace, category_id, self.settings.version
        )
    }

    /// Read a valid entry. Missing, malformed, version-mismatched and expired
    /// entries are all misses; the latter three are evicted.
    pub fn get(&self, key: &str) -> Option<Fragment> {
        if !self.settings.enabled {
            return None;
        }

        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match self.validate(&raw) {
            Ok(entry) => Some(entry.data),
            Err(rejection) => {
                match rejection.error_kind() {
                    Some(kind) => debug!(key, %kind, reason = ?rejection, "Evicting unreadable cache entry"),
                    None => debug!(key, reason = ?rejection, "Evicting invalid cache entry"),
                }
                if let Err(e) = self.storage.remove(key) {
                    debug!(key, error = %e, "Failed to evict cache entry");
                }
                None
            }
        }
    }

    /// Write `fragment` stamped with the current time and version. Best-effort.
    pub fn set(&self, key: &str, fragment: &Fragment) {
        if !self.settings.enabled {
            return;
        }

        let entry = CacheEntry {
            data: fragment.clone(),
            timestamp: self.clock.now_ms(),
            version: self.settings.version.clone(),
        };
        let encoded = match serde_json::to_string(&entry) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };
        if let Err(e) = self.storage.set(key, &encoded) {
            warn!(key, error = %e, "Cache write rejected, continuing without caching");
        }
    }

    pub fn get_category(&self, category_id: &str) -> Option<Fragment> {
        self.get(&self.key_for(category_id))
    }

    pub fn set_category(&self, category_id: &str, fragment: &Fragment) {
        self.set(&self.key_for(category_id), fragment)
    }

    /// Describe the stored entry for `category_id` without evicting it.
    pub fn inspect(&self, category_id: &str) -> Result<Option<EntryInspection>, StorageError> {
        let key = self.key_for(category_id);
        let Some(raw) = self.storage.get(&key)? else {
            return Ok(None);
        };
        let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) else {
            return Ok(Some(EntryInspection {
                key,
                version: String::new(),
                age: Duration::ZERO,
                item_count: 0,
                valid: false,
            }));
        };
        let age_ms = (self.clock.now_ms() - entry.timestamp).max(0);
        let valid = self.validate(&raw).is_ok();
        Ok(Some(EntryInspection {
            key,
            version: entry.version,
            age: Duration::from_millis(age_ms as u64),
            item_count: entry.data.item_count(),
            valid,
        }))
    }

    /// Remove every entry under the namespace, whatever its version.
    pub fn clear(&self) -> Result<usize, StorageError> {
        let prefix = format!("{}_", self.settings.namespace);
        let keys = self.storage.keys_with_prefix(&prefix)?;
        for key in &keys {
            self.storage.remove(key)?;
        }
        Ok(keys.len())
    }

    fn validate(&self, raw: &str) -> Result<CacheEntry, Rejection> {
        let entry: CacheEntry = serde_json::from_str(raw).map_err(Rejection::Decode)?;
        if entry.version != self.settings.version {
            return Err(Rejection::VersionMismatch(entry.version));
        }
        let age = self.clock.now_ms() - entry.timestamp;
        if age >= self.settings.ttl.as_millis() as i64 {
            return Err(Rejection::Expired(age));
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Child, Item};

    fn fragment(id: &str) -> Fragment {
        Fragment {
            id: id.to_string(),
            parent_name: "Tools".to_string(),
            parent_icon: "fa-wrench".to_string(),
            children: vec![Child {
                name: "Bots".to_string(),
                icon: "fa-robot".to_string(),
                items: vec![Item {
                    title: "Helper".to_string(),
                    url: "https://t.me/helper".to_string(),
                    description: "A bot".to_string(),
                    logo: None,
                }],
            }],
        }
    }

    fn store_with_clock(
        storage: Arc<MemoryStorage>,
        version: &str,
        clock: Arc<ManualClock>,
    ) -> CacheStore {
        let settings = CacheSettings {
            version: version.to_string(),
            ..CacheSettings::default()
        };
        CacheStore::with_clock(storage, settings, clock)
    }

    #[test]
    fn test_key_format() {
        let store = CacheStore::in_memory();
        assert_eq!(store.key_for("tools"), "tg_nav_category_tools_1.0.0");
    }

    #[test]
    fn test_set_then_get_returns_equal_fragment() {
        let store = CacheStore::in_memory();
        let key = store.key_for("tools");
        store.set(&key, &fragment("tools"));
        assert_eq!(store.get(&key), Some(fragment("tools")));
    }

    #[test]
    fn test_expired_entry_is_absent_and_removed() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let store = store_with_clock(storage.clone(), "1.0.0", clock.clone());
        let key = store.key_for("tools");

        store.set(&key, &fragment("tools"));
        clock.advance(DEFAULT_TTL);

        assert_eq!(store.get(&key), None);
        assert!(storage.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_entry_just_inside_ttl_is_valid() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(storage, "1.0.0", clock.clone());
        store.set_category("tools", &fragment("tools"));
        clock.advance(DEFAULT_TTL - Duration::from_millis(1));
        assert!(store.get_category("tools").is_some());
    }

    #[test]
    fn test_version_bump_orphans_old_entries() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(0));
        let v1 = store_with_clock(storage.clone(), "v1", clock.clone());
        v1.set_category("tools", &fragment("tools"));

        let v2 = store_with_clock(storage.clone(), "v2", clock);
        assert_eq!(v2.get_category("tools"), None);

        // Reading the old key under v2 rejects on the embedded version.
        assert_eq!(v2.get(&v1.key_for("tools")), None);
        assert!(storage.get(&v1.key_for("tools")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_entry_is_a_miss() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CacheStore::new(storage.clone(), CacheSettings::default());
        let key = store.key_for("tools");
        storage.set(&key, "{not json").unwrap();
        assert_eq!(
            store.validate("{not json").unwrap_err().error_kind(),
            Some(ErrorKind::CacheDecodeError)
        );
        assert_eq!(store.get(&key), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_stale_entries_carry_no_error_kind() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(0));
        let v1 = store_with_clock(storage.clone(), "v1", clock.clone());
        v1.set_category("tools", &fragment("tools"));
        let raw = storage.get(&v1.key_for("tools")).unwrap().unwrap();

        let v2 = store_with_clock(storage, "v2", clock.clone());
        assert!(v2.validate(&raw).unwrap_err().error_kind().is_none());

        clock.advance(DEFAULT_TTL);
        assert!(v1.validate(&raw).unwrap_err().error_kind().is_none());
    }

    #[test]
    fn test_rejected_write_is_swallowed() {
        let store = CacheStore::new(Arc::new(MemoryStorage::with_quota(8)), CacheSettings::default());
        store.set_category("tools", &fragment("tools"));
        assert_eq!(store.get_category("tools"), None);

        let disabled = CacheStore::new(Arc::new(DisabledStorage), CacheSettings::default());
        disabled.set_category("tools", &fragment("tools"));
        assert_eq!(disabled.get_category("tools"), None);
    }

    #[test]
    fn test_disabled_settings_bypass_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let settings = CacheSettings {
            enabled: false,
            ..CacheSettings::default()
        };
        let store = CacheStore::new(storage.clone(), settings);
        store.set_category("tools", &fragment("tools"));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_inspect_and_clear() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(storage.clone(), "1.0.0", clock.clone());
        store.set_category("tools", &fragment("tools"));
        store.set_category("games", &fragment("games"));
        storage.set("unrelated", "x").unwrap();
        clock.advance(Duration::from_secs(60));

        let inspection = store.inspect("tools").unwrap().unwrap();
        assert_eq!(inspection.age, Duration::from_secs(60));
        assert_eq!(inspection.item_count, 1);
        assert!(inspection.valid);
        assert!(store.inspect("missing").unwrap().is_none());

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(storage.len(), 1);
    }
}
