use super::*;
use crate::core::{Config, FileSystemSource, ManagerOptions, NotesManager, NotesWatcher};
use crate::publish::{
    generate_public_index, generate_public_tree, generate_sitegraph, plan_rename, TraversalConfig,
};
use crate::storage::DocumentRepository;
use crate::vcs::CommitRepository;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// 执行命令
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(notes) = cli.notes {
        config.notes_dir = notes;
    }

    match cli.command {
        Commands::Index(args) => index(&config, args).await,
        Commands::Tree(args) => tree(&config, args).await,
        Commands::Sitegraph(args) => sitegraph(&config, args).await,
        Commands::PublicIndex(args) => public_index(&config, args).await,
        Commands::Search(args) => search(&config, args).await,
        Commands::Rename(args) => rename(&config, args).await,
        Commands::Watch(args) => watch(&config, args).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn manager(config: &Config) -> NotesManager {
    let source = FileSystemSource::new(&config.notes_dir);
    NotesManager::with_options(
        Arc::new(source),
        ManagerOptions {
            debounce: config.debounce(),
            ..ManagerOptions::default()
        },
    )
}

/// 全量索引笔记目录
async fn indexed_manager(config: &Config) -> Result<NotesManager> {
    let manager = manager(config);
    let summary = manager
        .index_all()
        .await
        .with_context(|| format!("Failed to index {}", config.notes_dir.display()))?;
    for (slug, error) in &summary.errors {
        tracing::warn!("{}: {}", slug, error);
    }
    Ok(manager)
}

/// 在工作区或指定修订上执行
async fn with_repository<T>(
    config: &Config,
    rev: Option<&str>,
    f: impl FnOnce(&dyn DocumentRepository, &TraversalConfig) -> Result<T>,
) -> Result<T> {
    let traversal = config.traversal();
    match rev {
        Some(rev) => {
            let repo = CommitRepository::open(&config.notes_dir, rev)
                .with_context(|| format!("Failed to open revision {rev}"))?;
            let commit = repo.snapshot().info()?;
            info!("Reading notes from {}", commit.to_short());
            f(&repo, &traversal)
        }
        None => {
            let manager = indexed_manager(config).await?;
            let db = manager.db().await;
            f(&*db, &traversal)
        }
    }
}

pub async fn index(config: &Config, args: IndexArgs) -> Result<()> {
    match args.slug {
        Some(slug) => {
            let manager = manager(config);
            let result = manager.index(&slug).await?;
            info!("Indexed {}: {:?}", slug, result);
            let db = manager.db().await;
            print_json(&db.get(&slug))
        }
        None => {
            let manager = manager(config);
            let summary = manager.index_all().await?;
            print_json(&summary)
        }
    }
}

pub async fn tree(config: &Config, args: RevisionArgs) -> Result<()> {
    let tree = with_repository(config, args.rev.as_deref(), |repo, traversal| {
        Ok(generate_public_tree(repo, traversal))
    })
    .await?;
    print_json(&tree)
}

pub async fn sitegraph(config: &Config, args: RevisionArgs) -> Result<()> {
    let sitegraph = with_repository(config, args.rev.as_deref(), |repo, traversal| {
        let tree = generate_public_tree(repo, traversal);
        Ok(generate_sitegraph(repo, tree.ids(), traversal))
    })
    .await?;
    print_json(&sitegraph)
}

pub async fn public_index(config: &Config, args: PublicIndexArgs) -> Result<()> {
    let public = with_repository(config, args.rev.as_deref(), |repo, traversal| {
        Ok(generate_public_index(repo, traversal)?)
    })
    .await?;

    if let Some(base_url) = args.sitemap {
        println!("{}", public.sitemap(&base_url));
        return Ok(());
    }
    if args.toc {
        match &public.tree {
            Some(tree) => print!("{}", tree.toc()),
            None => tracing::warn!("Root note {} is not public", config.root),
        }
        return Ok(());
    }
    print_json(&public)
}

pub async fn search(config: &Config, args: SearchArgs) -> Result<()> {
    let manager = indexed_manager(config).await?;
    let db = manager.db().await;
    print_json(&db.search(&args.query, args.limit))
}

pub async fn rename(config: &Config, args: RenameArgs) -> Result<()> {
    let manager = indexed_manager(config).await?;
    let db = manager.db().await;
    if !db.contains(&args.from) {
        tracing::warn!("{} is not an indexed note", args.from);
    }
    print_json(&plan_rename(&db, &args.from, &args.to))
}

pub async fn watch(config: &Config, _args: WatchArgs) -> Result<()> {
    let manager = indexed_manager(config).await?;
    info!("Indexed {} notes", manager.db().await.len());

    let mut watcher = NotesWatcher::new(config.watch.clone())?;
    watcher
        .watch(&config.notes_dir)
        .with_context(|| format!("Failed to watch {}", config.notes_dir.display()))?;

    tokio::select! {
        _ = watcher.run(manager) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Stopped watching");
        }
    }
    Ok(())
}
