use linknav::config::LinknavConfig;
use linknav::tooling::cli::{CacheCommands, CliContext, Commands, OutputFormat};
use std::fs;
use tempfile::TempDir;

fn write_site(root: &std::path::Path) {
    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(
        root.join("data/index.json"),
        r#"{"meta": {"title": "Site"}, "categories": [
            {"id": "tools", "file": "tools.json", "preload": true, "parentName": "Tools",
             "children": [{"name": "Bots", "itemCount": 1}]},
            {"id": "games", "file": "games.json", "parentName": "Games",
             "children": [{"name": "Puzzles", "itemCount": 1}]}
        ]}"#,
    )
    .unwrap();
    for id in ["tools", "games"] {
        fs::write(
            root.join(format!("data/{}.json", id)),
            format!(
                r#"{{"id": "{}", "children": [{{"name": "All", "items": [{{"title": "{} link", "url": "https://t.me/{}"}}]}}]}}"#,
                id, id, id
            ),
        )
        .unwrap();
    }
}

fn context(temp: &TempDir) -> CliContext {
    let site = temp.path().join("site");
    write_site(&site);
    let mut config = LinknavConfig::default();
    config.source.base = site.to_string_lossy().into_owned();
    config.cache.path = Some(temp.path().join("cache"));
    CliContext::from_config(config).unwrap()
}

#[tokio::test]
async fn load_json_contract_has_required_fields() {
    let temp = TempDir::new().unwrap();
    let cli = context(&temp);

    let output = cli
        .execute(&Commands::Load {
            eager: false,
            visible: Vec::new(),
            format: OutputFormat::Json,
        })
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["mode"], "split");
    assert_eq!(parsed["preloaded"], serde_json::json!(["tools"]));
    assert!(parsed["preloadFailures"].as_array().unwrap().is_empty());
    let categories = parsed["view"]["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["loaded"], true);
    assert_eq!(categories[1]["loaded"], false);
    assert_eq!(categories[1]["children"][0]["itemCount"], 1);
}

#[tokio::test]
async fn category_fetch_is_cached_on_disk() {
    let temp = TempDir::new().unwrap();
    let cli = context(&temp);

    let output = cli
        .execute(&Commands::Category {
            id: "games".to_string(),
            no_cache: false,
            format: OutputFormat::Json,
        })
        .await
        .unwrap();
    let fragment: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(fragment["id"], "games");
    assert_eq!(fragment["children"][0]["items"][0]["title"], "games link");

    let inspect = cli
        .execute(&Commands::Cache {
            command: CacheCommands::Inspect {
                id: "games".to_string(),
            },
        })
        .await
        .unwrap();
    assert!(inspect.contains("tg_nav_category_games_1.0.0"));
    assert!(inspect.contains("yes"));
}

#[tokio::test]
async fn missing_site_reports_exhausted_sources() {
    let temp = TempDir::new().unwrap();
    let mut config = LinknavConfig::default();
    config.source.base = temp.path().join("nowhere").to_string_lossy().into_owned();
    config.cache.enabled = false;
    let cli = CliContext::from_config(config).unwrap();

    let err = cli
        .execute(&Commands::Load {
            eager: false,
            visible: Vec::new(),
            format: OutputFormat::Text,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("data.json"));
}
