use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "notegraph")]
#[command(about = "Index markdown notes and derive the public note graph")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./notegraph.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Notes directory, overrides `notes_dir` from the config
    #[arg(long, global = true)]
    pub notes: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index all notes (or a single note) and print the result
    Index(IndexArgs),

    /// Print the public tree
    Tree(RevisionArgs),

    /// Print the sitegraph of publicly reachable notes
    Sitegraph(RevisionArgs),

    /// Print the public search index, sitemap or table of contents
    PublicIndex(PublicIndexArgs),

    /// Full-text search
    Search(SearchArgs),

    /// Plan renaming a note
    Rename(RenameArgs),

    /// Watch the notes directory and reindex on change
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Only index this note
    pub slug: Option<String>,
}

#[derive(Args, Debug)]
pub struct RevisionArgs {
    /// Read notes from this git revision instead of the working directory
    #[arg(long)]
    pub rev: Option<String>,
}

#[derive(Args, Debug)]
pub struct PublicIndexArgs {
    /// Read notes from this git revision instead of the working directory
    #[arg(long)]
    pub rev: Option<String>,

    /// Print sitemap.txt using this base URL
    #[arg(long, value_name = "BASE_URL", conflicts_with = "toc")]
    pub sitemap: Option<String>,

    /// Print a markdown table of contents
    #[arg(long)]
    pub toc: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Current slug
    pub from: String,
    /// New slug
    pub to: String,
}

#[derive(Args, Debug)]
pub struct WatchArgs {}
