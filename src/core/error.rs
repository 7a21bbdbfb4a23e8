//! 错误类型
//!
//! 单篇笔记的错误（解析失败、读取失败）只影响该笔记，
//! 整个索引流程失败（例如扫描失败）才会传递给调用方。

use thiserror::Error;

/// 笔记引擎错误
#[derive(Debug, Error)]
pub enum NotesError {
    /// frontmatter 或 markdown 格式错误
    #[error("failed to parse note {slug}: {message}")]
    Parse { slug: String, message: String },

    /// 笔记来源读取失败
    #[error("failed to read note {slug}: {message}")]
    SourceRead { slug: String, message: String },

    /// 笔记不存在
    #[error("note not found: {0}")]
    NotFound(String),

    /// 搜索索引中已存在相同 ID
    #[error("duplicate document in search index: {0}")]
    DuplicateDocument(String),

    /// Git 快照错误
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 配置文件错误
    #[error("invalid config: {0}")]
    Config(String),

    /// 整个索引流程失败
    #[error("reindex pass failed: {0}")]
    PassFailed(String),
}

impl NotesError {
    pub fn parse(slug: &str, message: impl Into<String>) -> Self {
        NotesError::Parse {
            slug: slug.to_string(),
            message: message.into(),
        }
    }

    pub fn source_read(slug: &str, message: impl Into<String>) -> Self {
        NotesError::SourceRead {
            slug: slug.to_string(),
            message: message.into(),
        }
    }

    /// 是否是“只影响单篇笔记”的错误
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            NotesError::Parse { .. } | NotesError::SourceRead { .. } | NotesError::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;
