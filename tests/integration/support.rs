use linknav::cache::CacheStore;
use linknav::orchestrator::{Orchestrator, OrchestratorOptions};
use linknav::render::RecordingRenderer;
use linknav::transport::MemoryTransport;
use serde_json::{json, Value};
use std::sync::Arc;

pub const INDEX_PATH: &str = "data/index.json";
pub const LEGACY_PATH: &str = "data.json";

pub fn fragment_path(id: &str) -> String {
    format!("data/{}.json", id)
}

/// Index with `ids` in order; only `preload` ids carry the preload flag.
pub fn index_json(ids: &[&str], preload: &[&str]) -> Value {
    let categories: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "file": format!("{}.json", id),
                "preload": preload.contains(id),
                "parentName": id.to_uppercase(),
                "parentIcon": "fa-folder",
                "children": [
                    {"name": format!("{} channels", id), "icon": "fa-bullhorn", "itemCount": 2},
                    {"name": format!("{} groups", id), "icon": "fa-users", "itemCount": 1}
                ]
            })
        })
        .collect();
    json!({"meta": {"title": "Directory"}, "categories": categories})
}

pub fn fragment_json(id: &str) -> Value {
    json!({
        "id": id,
        "parentName": id.to_uppercase(),
        "parentIcon": "fa-folder",
        "children": [
            {"name": format!("{} channels", id), "icon": "fa-bullhorn", "items": [
                {"title": format!("{} one", id), "url": "https://t.me/one", "description": "first"},
                {"title": format!("{} two", id), "url": "https://t.me/two", "description": "second"}
            ]},
            {"name": format!("{} groups", id), "icon": "fa-users", "items": [
                {"title": format!("{} chat", id), "url": "https://t.me/chat"}
            ]}
        ]
    })
}

pub fn legacy_json() -> Value {
    json!({
        "meta": {"title": "Legacy"},
        "categories": [
            {"parentName": "News", "parentIcon": "fa-news", "children": [
                {"name": "Daily", "icon": "fa-sun", "items": [
                    {"title": "Morning", "url": "https://t.me/morning"}
                ]}
            ]},
            {"id": "archive", "parentName": "Archive", "hidden": true, "children": []}
        ]
    })
}

/// Transport serving a split site with the given categories.
pub fn split_site(ids: &[&str], preload: &[&str]) -> Arc<MemoryTransport> {
    let transport = Arc::new(MemoryTransport::new());
    transport.insert_json(INDEX_PATH, &index_json(ids, preload));
    for id in ids {
        transport.insert_json(fragment_path(id), &fragment_json(id));
    }
    transport
}

pub struct Session {
    pub transport: Arc<MemoryTransport>,
    pub renderer: Arc<RecordingRenderer>,
    pub cache: Arc<CacheStore>,
    pub orchestrator: Orchestrator,
}

pub fn session_with_cache(transport: Arc<MemoryTransport>, cache: Arc<CacheStore>) -> Session {
    let renderer = Arc::new(RecordingRenderer::new());
    let orchestrator = Orchestrator::new(
        transport.clone(),
        Arc::clone(&cache),
        renderer.clone(),
        OrchestratorOptions::default(),
    );
    Session {
        transport,
        renderer,
        cache,
        orchestrator,
    }
}

pub fn session(transport: Arc<MemoryTransport>) -> Session {
    session_with_cache(transport, Arc::new(CacheStore::in_memory()))
}
