use crate::integration::support::*;
use linknav::cache::{CacheSettings, CacheStorage, CacheStore, ManualClock, SledStorage};
use linknav::transport::MemoryTransport;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn sled_cache(storage: Arc<SledStorage>, settings: CacheSettings) -> Arc<CacheStore> {
    Arc::new(CacheStore::new(storage, settings))
}

#[tokio::test]
async fn second_session_reads_fragments_from_disk() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("fragments");

    {
        let storage = Arc::new(SledStorage::open(&db_path).unwrap());
        let s = session_with_cache(
            split_site(&["news", "tools"], &["tools"]),
            sled_cache(Arc::clone(&storage), CacheSettings::default()),
        );
        s.orchestrator.run().await.unwrap();
        storage.flush().unwrap();
    }

    let storage = Arc::new(SledStorage::open(&db_path).unwrap());
    let transport = Arc::new(MemoryTransport::new());
    transport.insert_json(INDEX_PATH, &index_json(&["news", "tools"], &["tools"]));
    let s = session_with_cache(transport, sled_cache(storage, CacheSettings::default()));

    let outcome = s.orchestrator.run().await.unwrap();
    assert_eq!(outcome.preloaded, vec!["tools".to_string()]);
    assert_eq!(s.transport.fetch_count(&fragment_path("tools")), 0);
    let view = s.orchestrator.merged_view().unwrap();
    assert_eq!(view.category("tools").unwrap().item_count(), 3);
}

#[tokio::test]
async fn version_bump_orphans_old_entries() {
    let temp = TempDir::new().unwrap();
    let storage = Arc::new(SledStorage::open(&temp.path().join("fragments")).unwrap());

    let first = session_with_cache(
        split_site(&["tools"], &["tools"]),
        sled_cache(Arc::clone(&storage), CacheSettings::default()),
    );
    first.orchestrator.run().await.unwrap();

    let bumped = CacheSettings {
        version: "2.0.0".to_string(),
        ..CacheSettings::default()
    };
    let second = session_with_cache(
        split_site(&["tools"], &["tools"]),
        sled_cache(Arc::clone(&storage), bumped),
    );
    second.orchestrator.run().await.unwrap();
    assert_eq!(second.transport.fetch_count(&fragment_path("tools")), 1);

    let keys = storage.keys_with_prefix("tg_nav_category_tools_").unwrap();
    assert_eq!(
        keys,
        vec![
            "tg_nav_category_tools_1.0.0".to_string(),
            "tg_nav_category_tools_2.0.0".to_string(),
        ]
    );
}

#[tokio::test]
async fn expired_entries_trigger_a_refetch() {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let cache = Arc::new(CacheStore::with_clock(
        Arc::new(linknav::cache::MemoryStorage::new()),
        CacheSettings::default(),
        clock.clone(),
    ));

    let first = session_with_cache(split_site(&["tools"], &["tools"]), Arc::clone(&cache));
    first.orchestrator.run().await.unwrap();
    assert_eq!(first.transport.fetch_count(&fragment_path("tools")), 1);

    clock.advance(Duration::from_secs(23 * 60 * 60));
    let fresh = session_with_cache(split_site(&["tools"], &["tools"]), Arc::clone(&cache));
    fresh.orchestrator.run().await.unwrap();
    assert_eq!(fresh.transport.fetch_count(&fragment_path("tools")), 0);

    clock.advance(Duration::from_secs(60 * 60));
    let stale = session_with_cache(split_site(&["tools"], &["tools"]), Arc::clone(&cache));
    stale.orchestrator.run().await.unwrap();
    assert_eq!(stale.transport.fetch_count(&fragment_path("tools")), 1);
}
