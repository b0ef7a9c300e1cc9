use crate::integration::support::*;
use futures::future::join_all;
use linknav::loader::CategoryState;
use linknav::viewport::{SectionId, SectionLayout, TriggerOutcome, Viewport};

#[tokio::test]
async fn navigation_racing_the_trigger_fetches_once() {
    let s = session(split_site(&["news", "tools", "games"], &[]));
    s.orchestrator.run().await.unwrap();
    let trigger = s.orchestrator.trigger().unwrap();

    let (visible, navigated) = tokio::join!(
        trigger.section_visible(SectionId::new(2, 0)),
        s.orchestrator.navigate("games"),
    );
    assert_eq!(visible, TriggerOutcome::Loaded("games".to_string()));
    assert!(navigated.is_ok());
    assert_eq!(s.transport.fetch_count(&fragment_path("games")), 1);
    assert_eq!(s.orchestrator.loader().state("games"), CategoryState::Loaded);
    assert_eq!(s.renderer.category_updates(), vec!["games".to_string()]);
}

#[tokio::test]
async fn many_waiters_share_one_failure() {
    let transport = split_site(&["news"], &[]);
    transport.fail(fragment_path("news"), 502);
    let s = session(transport);
    s.orchestrator.run().await.unwrap();

    let loader = s.orchestrator.loader();
    let results = join_all((0..8).map(|_| loader.load_category("news", true))).await;
    assert!(results.iter().all(|r| r.is_err()));
    let first = results[0].as_ref().unwrap_err();
    assert!(results.iter().all(|r| r.as_ref().unwrap_err() == first));
    assert_eq!(s.transport.fetch_count(&fragment_path("news")), 1);
    assert_eq!(loader.state("news"), CategoryState::LoadFailed);
}

#[tokio::test]
async fn scroll_loads_near_sections_within_margin() {
    let s = session(split_site(&["news", "tools", "games"], &[]));
    s.orchestrator.run().await.unwrap();
    let trigger = s.orchestrator.trigger().unwrap();

    let layout: Vec<SectionLayout> = (0..3)
        .flat_map(|category| {
            (0..2).map(move |child| {
                let top = (category * 2 + child) as f64 * 500.0;
                SectionLayout::new(SectionId::new(category, child), top, 500.0)
            })
        })
        .collect();

    let outcomes = trigger
        .on_scroll(&Viewport::new(0.0, 700.0), &layout)
        .await;
    assert_eq!(outcomes, vec![TriggerOutcome::Loaded("news".to_string())]);

    let outcomes = trigger
        .on_scroll(&Viewport::new(1100.0, 800.0), &layout)
        .await;
    assert_eq!(
        outcomes,
        vec![
            TriggerOutcome::Loaded("tools".to_string()),
            TriggerOutcome::Loaded("games".to_string()),
        ]
    );
    assert_eq!(s.transport.total_fetches(), 4);
    assert!(trigger.observed_sections().is_empty());
    assert_eq!(
        s.renderer.category_updates(),
        vec!["news".to_string(), "tools".to_string(), "games".to_string()]
    );
}
