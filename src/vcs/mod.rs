//! 版本控制模块
//!
//! 以某个 Git 提交作为笔记来源或文档仓库：
//!
//! - [`GitSource`] - 实现 [`NotesSource`]，供索引管理器读取
//! - [`CommitRepository`] - 实现 [`DocumentRepository`]，按需索引公开笔记，
//!   用于从历史版本生成公开索引和站点图

pub mod git_engine;

pub use git_engine::{CommitInfo, GitSnapshot};

use crate::core::error::Result;
use crate::core::indexer::{index_note, IndexOptions};
use crate::core::note::NoteRecord;
use crate::core::source::NotesSource;
use crate::storage::{DocumentRepository, NotesDatabase};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Git 提交作为笔记来源
#[derive(Clone)]
pub struct GitSource {
    snapshot: Arc<GitSnapshot>,
}

impl GitSource {
    pub fn new(snapshot: Arc<GitSnapshot>) -> Self {
        Self { snapshot }
    }

    /// 打开仓库中的某个修订
    pub fn open(root: &Path, rev: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(GitSnapshot::open(root, rev)?)))
    }

    pub fn snapshot(&self) -> &GitSnapshot {
        &self.snapshot
    }
}

#[async_trait]
impl NotesSource for GitSource {
    async fn scan(&self) -> Result<Vec<String>> {
        self.snapshot.list_notes()
    }

    async fn read(&self, slug: &str) -> Result<String> {
        self.snapshot.read_note(slug)
    }
}

#[derive(Default)]
struct CommitCache {
    db: NotesDatabase,
    /// 已尝试过的 slug（包括不存在、非公开、解析失败的）
    attempted: HashSet<String>,
}

/// 某个提交中的公开笔记
///
/// 第一次访问某篇笔记时才从提交中读取并以公开模式索引
pub struct CommitRepository {
    snapshot: Arc<GitSnapshot>,
    cache: Mutex<CommitCache>,
}

impl CommitRepository {
    pub fn new(snapshot: Arc<GitSnapshot>) -> Self {
        Self {
            snapshot,
            cache: Mutex::new(CommitCache::default()),
        }
    }

    /// 打开仓库中的某个修订
    pub fn open(root: &Path, rev: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(GitSnapshot::open(root, rev)?)))
    }

    pub fn snapshot(&self) -> &GitSnapshot {
        &self.snapshot
    }

    /// 已载入的公开笔记数
    pub fn loaded(&self) -> usize {
        self.cache
            .lock()
            .map(|cache| cache.db.len())
            .unwrap_or_default()
    }
}

impl DocumentRepository for CommitRepository {
    fn get_document(&self, id: &str) -> Option<NoteRecord> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if cache.attempted.insert(id.to_string()) {
            match self.snapshot.read_note(id) {
                Ok(source) => {
                    if let Err(e) = index_note(&mut cache.db, id, &source, &IndexOptions::public_only()) {
                        tracing::warn!("Failed to index {} from {}: {}", id, self.snapshot.oid(), e);
                    }
                }
                Err(e) if e.is_local() => {
                    tracing::trace!("{} not available in {}: {}", id, self.snapshot.oid(), e);
                }
                Err(e) => {
                    tracing::warn!("Failed to read {} from {}: {}", id, self.snapshot.oid(), e);
                }
            }
        }

        cache.db.get(id).cloned()
    }
}
