//! Git 快照
//!
//! 使用 libgit2 (git2 crate) 读取某个提交中的笔记，不需要检出工作区

use crate::core::error::{NotesError, Result};
use crate::core::source::{is_valid_slug, slug_from_path, NOTE_EXTENSION};
use chrono::{DateTime, TimeZone, Utc};
use git2::{ObjectType, Oid, Repository};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// 提交信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitInfo {
    /// Git OID
    pub oid: String,
    /// 提交消息
    pub message: String,
    /// 作者
    pub author: String,
    /// 时间戳
    pub timestamp: String,
}

impl CommitInfo {
    /// 简短格式：`<7 位 OID> - <消息首行>`
    pub fn to_short(&self) -> String {
        let short_oid: String = self.oid.chars().take(7).collect();
        format!("{} - {}", short_oid, self.message.lines().next().unwrap_or(""))
    }
}

/// 某个提交的只读快照
pub struct GitSnapshot {
    /// git2::Repository 不是 Sync，读取时加锁
    repo: Mutex<Repository>,
    /// 提交 OID
    commit: Oid,
}

impl GitSnapshot {
    /// 打开仓库并解析修订
    ///
    /// # Arguments
    ///
    /// * `root` - 仓库路径
    /// * `rev` - 修订，例如 `HEAD`、分支名或提交哈希
    pub fn open(root: &Path, rev: &str) -> Result<Self> {
        let repo = Repository::open(root)?;
        let commit = repo.revparse_single(rev)?.peel_to_commit()?.id();
        tracing::debug!("Opened git snapshot {} ({}) at {:?}", rev, commit, root);

        Ok(Self {
            repo: Mutex::new(repo),
            commit,
        })
    }

    /// 提交 OID
    pub fn oid(&self) -> Oid {
        self.commit
    }

    fn repo(&self) -> MutexGuard<'_, Repository> {
        self.repo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 提交信息
    pub fn info(&self) -> Result<CommitInfo> {
        let repo = self.repo();
        let commit = repo.find_commit(self.commit)?;
        let author = commit.author();
        let info = CommitInfo {
            oid: self.commit.to_string(),
            message: commit.message().unwrap_or("").trim_end().to_string(),
            author: author.to_string(),
            timestamp: format_timestamp(commit.time()),
        };
        Ok(info)
    }

    /// 提交顶层目录中的全部笔记 slug（按字母序）
    pub fn list_notes(&self) -> Result<Vec<String>> {
        let repo = self.repo();
        let tree = repo.find_commit(self.commit)?.tree()?;

        let mut slugs: Vec<String> = tree
            .iter()
            .filter(|entry| entry.kind() == Some(ObjectType::Blob))
            .filter_map(|entry| entry.name().map(|name| Path::new(name).to_path_buf()))
            .filter_map(|path| slug_from_path(&path))
            .filter(|slug| is_valid_slug(slug))
            .collect();
        slugs.sort();
        Ok(slugs)
    }

    /// 读取笔记源码
    ///
    /// 不存在时返回 [`NotesError::NotFound`]
    pub fn read_note(&self, slug: &str) -> Result<String> {
        if !is_valid_slug(slug) {
            return Err(NotesError::NotFound(slug.to_string()));
        }

        let repo = self.repo();
        let tree = repo.find_commit(self.commit)?.tree()?;
        let file_name = format!("{slug}.{NOTE_EXTENSION}");
        let Some(entry) = tree.get_name(&file_name) else {
            return Err(NotesError::NotFound(slug.to_string()));
        };

        let blob = entry.to_object(&repo)?.peel_to_blob()?;
        String::from_utf8(blob.content().to_vec())
            .map_err(|e| NotesError::source_read(slug, e.to_string()))
    }
}

/// 格式化 git2::Time 为字符串
fn format_timestamp(time: git2::Time) -> String {
    let datetime: DateTime<Utc> = Utc
        .timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or_default();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}
