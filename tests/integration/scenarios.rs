use crate::integration::support::*;
use linknav::error::{ErrorKind, LoadError};
use linknav::orchestrator::{SessionMode, SessionState};
use linknav::transport::MemoryTransport;
use linknav::viewport::{SectionId, TriggerOutcome};
use std::sync::Arc;

#[tokio::test]
async fn skeleton_then_full_render_with_one_preloaded_category() {
    let s = session(split_site(&["news", "tools", "games"], &["tools"]));

    let outcome = s.orchestrator.run().await.unwrap();
    assert_eq!(outcome.mode, SessionMode::Split);
    assert_eq!(outcome.preloaded, vec!["tools".to_string()]);
    assert!(outcome.preload_failures.is_empty());

    let skeletons = s.renderer.skeletons();
    assert_eq!(skeletons.len(), 1);
    assert_eq!(skeletons[0].categories.len(), 3);
    assert!(skeletons[0].categories.iter().all(|c| !c.loaded));
    assert_eq!(skeletons[0].categories[0].children[0].item_count, 2);

    let full = s.renderer.full_renders();
    assert_eq!(full.len(), 1);
    let ids: Vec<&str> = full[0].categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["news", "tools", "games"]);
    assert!(full[0].category("tools").unwrap().loaded);
    assert_eq!(full[0].stub_ids(), vec!["news", "games"]);

    assert_eq!(s.transport.fetch_count(&fragment_path("tools")), 1);
    assert_eq!(s.transport.fetch_count(&fragment_path("news")), 0);
    assert_eq!(s.orchestrator.state(), SessionState::Ready);
    assert!(s.renderer.errors().is_empty());
}

#[tokio::test]
async fn index_failure_falls_back_to_legacy_dataset() {
    let transport = Arc::new(MemoryTransport::new());
    transport.fail(INDEX_PATH, 503);
    transport.insert_json(LEGACY_PATH, &legacy_json());
    let s = session(transport);

    let outcome = s.orchestrator.run().await.unwrap();
    assert_eq!(outcome.mode, SessionMode::Legacy);
    assert!(s.renderer.skeletons().is_empty());

    let full = s.renderer.full_renders();
    assert_eq!(full.len(), 1);
    assert!(full[0].is_fully_loaded());
    assert_eq!(full[0].categories[0].id, "category-0");
    assert!(full[0].category("archive").unwrap().hidden);

    let fragment = s.orchestrator.navigate("category-0").await.unwrap();
    assert_eq!(fragment.children[0].items[0].title, "Morning");
    assert!(s.orchestrator.trigger().is_none());
    assert_eq!(s.transport.total_fetches(), 2);
    assert!(s.renderer.category_updates().is_empty());
}

#[tokio::test]
async fn both_sources_failing_renders_one_terminal_error() {
    let transport = Arc::new(MemoryTransport::new());
    transport.fail(INDEX_PATH, 500);
    let s = session(transport);

    let err = s.orchestrator.run().await.unwrap_err();
    assert!(matches!(err, LoadError::AllSourcesExhausted { .. }));
    let fetches_after_failure = s.transport.total_fetches();
    assert_eq!(fetches_after_failure, 2);

    let again = s.orchestrator.run().await.unwrap_err();
    assert_eq!(again, err);

    let errors = s.renderer.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, ErrorKind::AllSourcesExhausted);
    assert!(errors[0].1.contains("data/index.json"));
    assert!(errors[0].1.contains("data.json"));
    assert!(s.renderer.full_renders().is_empty());
    assert_eq!(s.transport.total_fetches(), fetches_after_failure);
    assert_eq!(s.orchestrator.state(), SessionState::Error);
}

#[tokio::test]
async fn trigger_for_loaded_category_issues_no_fetch_or_render() {
    let s = session(split_site(&["news", "tools"], &[]));
    s.orchestrator.run().await.unwrap();
    let trigger = s.orchestrator.trigger().unwrap();

    let first = trigger.section_visible(SectionId::new(1, 0)).await;
    assert_eq!(first, TriggerOutcome::Loaded("tools".to_string()));

    s.orchestrator.navigate("news").await.unwrap();
    let updates_before = s.renderer.category_updates();
    let outcome = trigger.section_visible(SectionId::new(0, 1)).await;
    assert_eq!(outcome, TriggerOutcome::AlreadyLoaded("news".to_string()));

    assert_eq!(s.transport.fetch_count(&fragment_path("news")), 1);
    assert_eq!(s.transport.fetch_count(&fragment_path("tools")), 1);
    assert_eq!(s.renderer.category_updates(), updates_before);
    assert_eq!(updates_before, vec!["tools".to_string(), "news".to_string()]);
}

#[tokio::test]
async fn failed_preload_stays_stub_and_navigation_retries() {
    let transport = split_site(&["news", "tools"], &["news", "tools"]);
    transport.fail(fragment_path("news"), 404);
    let s = session(transport);

    let outcome = s.orchestrator.run().await.unwrap();
    assert_eq!(outcome.preloaded, vec!["tools".to_string()]);
    assert_eq!(outcome.preload_failures.len(), 1);
    assert_eq!(outcome.preload_failures[0].0, "news");
    assert_eq!(
        s.renderer.full_renders()[0].stub_ids(),
        vec!["news"]
    );
    assert_eq!(
        s.renderer.full_renders()[0].unavailable_ids(),
        vec!["news"]
    );

    let trigger = s.orchestrator.trigger().unwrap();
    assert_eq!(
        trigger.section_visible(SectionId::new(0, 0)).await,
        TriggerOutcome::PreviouslyFailed("news".to_string())
    );

    s.transport
        .insert_json(fragment_path("news"), &fragment_json("news"));
    s.orchestrator.navigate("news").await.unwrap();
    assert_eq!(s.renderer.category_updates(), vec!["news".to_string()]);
    assert!(s.orchestrator.merged_view().unwrap().is_fully_loaded());
    assert!(s.orchestrator.merged_view().unwrap().unavailable_ids().is_empty());
}

#[tokio::test]
async fn teardown_discards_late_results() {
    let s = session(split_site(&["news"], &[]));
    s.orchestrator.run().await.unwrap();
    let trigger = s.orchestrator.trigger().unwrap();
    s.orchestrator.teardown();

    assert_eq!(
        trigger.section_visible(SectionId::new(0, 0)).await,
        TriggerOutcome::Inactive
    );
    assert_eq!(s.transport.fetch_count(&fragment_path("news")), 0);
    assert!(s.renderer.category_updates().is_empty());
}
