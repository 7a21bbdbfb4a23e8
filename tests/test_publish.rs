//! 公开产物集成测试：目录 → 索引 → 公开树 / 公开索引 / 站点图

use notegraph::core::{FileSystemSource, ManagerOptions, NotesManager};
use notegraph::publish::{
    generate_public_index, generate_public_tree, generate_sitegraph, plan_rename,
    TraversalConfig,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn write(dir: &Path, slug: &str, content: &str) {
    fs::write(dir.join(format!("{slug}.md")), content).unwrap();
}

fn garden(dir: &Path) {
    write(
        dir,
        "HomePage",
        "---\npublic: true\n---\n# Welcome\n\nStart at [Topics](Topics) or [Recent](Recent). [Draft](Draft)",
    );
    write(
        dir,
        "Topics",
        "---\npublic: true\ntopic: true\n---\nTopics. [Rust](Rust) [Cooking](Cooking#pasta)",
    );
    write(dir, "Rust", "---\npublic: true\n---\nRust language. Systems programming, see [Cooking](Cooking).");
    write(dir, "Cooking", "---\npublic: true\naka: [recipes]\n---\nCooking. Pasta and bread.");
    write(dir, "Recent", "---\npublic: true\n---\nRecent changes. [Rust](Rust)");
    write(dir, "Draft", "Draft. Private thoughts about [Secret](Secret)");
    write(dir, "Secret", "---\npublic: true\n---\nSecret. Only reachable through a draft");
}

async fn indexed(dir: &Path) -> NotesManager {
    let manager = NotesManager::with_options(
        Arc::new(FileSystemSource::new(dir)),
        ManagerOptions {
            debounce: Duration::from_millis(5),
            ..ManagerOptions::default()
        },
    );
    manager.index_all().await.unwrap();
    manager
}

#[tokio::test]
async fn test_public_tree_from_directory() {
    let temp = TempDir::new().unwrap();
    garden(temp.path());
    let manager = indexed(temp.path()).await;
    let db = manager.db().await;

    let tree = generate_public_tree(&*db, &TraversalConfig::default());

    let ids: Vec<_> = tree.ids().collect();
    assert_eq!(ids, vec!["Cooking", "HomePage", "Recent", "Rust", "Topics"]);
    assert_eq!(tree.parent_of("Topics"), Some("HomePage"));
    assert_eq!(tree.parent_of("Rust"), Some("Topics"));
    assert_eq!(tree.parent_of("Cooking"), Some("Topics"));
    assert_eq!(tree.parent_of("Recent"), Some("HomePage"));
    assert_eq!(tree.nodes["Topics"].title, "Topics (topic)");
    assert!(!tree.contains("Draft"));
    assert!(!tree.contains("Secret"));
}

#[tokio::test]
async fn test_public_index_from_directory() {
    let temp = TempDir::new().unwrap();
    garden(temp.path());
    let manager = indexed(temp.path()).await;
    let db = manager.db().await;

    let public = generate_public_index(&*db, &TraversalConfig::default()).unwrap();

    assert_eq!(public.ids, vec!["HomePage", "Topics", "Rust", "Cooking", "Recent"]);
    assert_eq!(public.index.len(), 5);
    assert_eq!(public.index.search("recipes", 10)[0].id, "Cooking");
    assert!(public.index.search("thoughts", 10).is_empty());

    let tree = public.tree.as_ref().unwrap();
    assert_eq!(tree.title, "Welcome");
    assert_eq!(tree.count(), 5);
    assert!(public.sitemap("https://notes.example.com").starts_with("https://notes.example.com/HomePage\n"));
}

#[tokio::test]
async fn test_sitegraph_from_directory() {
    let temp = TempDir::new().unwrap();
    garden(temp.path());
    let manager = indexed(temp.path()).await;
    let db = manager.db().await;
    let config = TraversalConfig::default();

    let public = generate_public_index(&*db, &config).unwrap();
    let sitegraph = generate_sitegraph(&*db, &public.ids, &config);

    assert_eq!(sitegraph.len(), 4);
    assert!(!sitegraph.nodes.contains_key("Recent"));
    let topics: Vec<_> = sitegraph.nodes["Topics"]
        .links
        .iter()
        .map(|l| l.link.as_str())
        .collect();
    assert_eq!(topics, vec!["Rust", "Cooking"]);
}

#[tokio::test]
async fn test_outputs_stable_across_reindex() {
    let temp = TempDir::new().unwrap();
    garden(temp.path());
    let manager = indexed(temp.path()).await;
    let config = TraversalConfig::default();

    let before = {
        let db = manager.db().await;
        serde_json::to_string(&generate_public_tree(&*db, &config)).unwrap()
    };
    manager.index_all().await.unwrap();
    let after = {
        let db = manager.db().await;
        serde_json::to_string(&generate_public_tree(&*db, &config)).unwrap()
    };

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_deleted_note_leaves_tree() {
    let temp = TempDir::new().unwrap();
    garden(temp.path());
    let manager = indexed(temp.path()).await;

    fs::remove_file(temp.path().join("Rust.md")).unwrap();
    manager.index_all().await.unwrap();

    let db = manager.db().await;
    let tree = generate_public_tree(&*db, &TraversalConfig::default());
    assert!(!tree.contains("Rust"));
    assert!(tree.contains("Cooking"));
}

#[tokio::test]
async fn test_rename_plan_from_directory() {
    let temp = TempDir::new().unwrap();
    garden(temp.path());
    let manager = indexed(temp.path()).await;
    let db = manager.db().await;

    let plan = plan_rename(&db, "Rust", "RustLang");
    let updates: Vec<_> = plan.link_updates().collect();
    assert_eq!(updates, vec!["Recent", "Topics"]);
    assert_eq!(plan.operations.len(), 3);
}
