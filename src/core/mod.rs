pub mod config;
pub mod error;
pub mod indexer;
pub mod manager;
pub mod note;
pub mod object;
pub mod parser;
pub mod source;
pub mod watch_config;
pub mod watcher;

// 重新导出 error 模块中的公共 API
pub use error::{NotesError, Result};

// 重新导出 parser 模块中的公共 API
pub use parser::{parse_frontmatter, Frontmatter, MarkdownContent};

// 重新导出 indexer 模块中的公共 API
pub use indexer::{index_note, unindex_note, IndexOptions, IndexResult, IndexSummary};

// 重新导出 manager 与 source 模块中的公共 API
pub use manager::{ManagerOptions, NotesManager};
pub use source::{FileSystemSource, NotesSource};

pub use config::Config;
pub use note::NoteRecord;
pub use watch_config::WatchConfig;
pub use watcher::{FileEvent, NotesWatcher};
