//! 笔记来源
//!
//! 索引管理器只通过 [`NotesSource`] 读取笔记，来源可以是目录，也可以是 Git 提交

use crate::core::error::{NotesError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 笔记文件扩展名
pub const NOTE_EXTENSION: &str = "md";

/// 笔记来源
#[async_trait]
pub trait NotesSource: Send + Sync {
    /// 列出全部 slug
    ///
    /// 失败时整个索引流程失败
    async fn scan(&self) -> Result<Vec<String>>;

    /// 读取笔记源码
    ///
    /// 笔记不存在时返回 [`NotesError::NotFound`]
    async fn read(&self, slug: &str) -> Result<String>;
}

/// 由文件名得到 slug：`HomePage.md` → `HomePage`
pub fn slug_from_path(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != NOTE_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

/// slug 是否可以安全地映射到文件名
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\'])
}

/// 本地目录来源
///
/// 只读取目录顶层的 `*.md` 文件
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    /// 创建目录来源
    ///
    /// # Arguments
    ///
    /// * `root` - 笔记目录
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 笔记目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// slug 对应的文件路径
    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{slug}.{NOTE_EXTENSION}"))
    }
}

#[async_trait]
impl NotesSource for FileSystemSource {
    async fn scan(&self) -> Result<Vec<String>> {
        let mut slugs = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(slug) = slug_from_path(entry.path()) {
                if is_valid_slug(&slug) {
                    slugs.push(slug);
                }
            }
        }
        slugs.sort();
        tracing::debug!("Scanned {} notes in {:?}", slugs.len(), self.root);
        Ok(slugs)
    }

    async fn read(&self, slug: &str) -> Result<String> {
        if !is_valid_slug(slug) {
            return Err(NotesError::NotFound(slug.to_string()));
        }
        match tokio::fs::read_to_string(self.path_for(slug)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(NotesError::NotFound(slug.to_string()))
            }
            Err(e) => Err(NotesError::source_read(slug, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_slug_from_path() {
        assert_eq!(slug_from_path(Path::new("notes/HomePage.md")), Some("HomePage".to_string()));
        assert_eq!(slug_from_path(Path::new("notes/image.png")), None);
        assert_eq!(slug_from_path(Path::new("README")), None);
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("HomePage"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../secret"));
        assert!(!is_valid_slug(".hidden"));
    }

    #[tokio::test]
    async fn test_scan_top_level_markdown_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("B.md"), "b").unwrap();
        fs::write(dir.path().join("A.md"), "a").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("C.md"), "c").unwrap();

        let source = FileSystemSource::new(dir.path());
        assert_eq!(source.scan().await.unwrap(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_scan_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let source = FileSystemSource::new(dir.path().join("nope"));
        assert!(source.scan().await.is_err());
    }

    #[tokio::test]
    async fn test_read() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.md"), "Alpha. body").unwrap();

        let source = FileSystemSource::new(dir.path());
        assert_eq!(source.read("A").await.unwrap(), "Alpha. body");

        let err = source.read("Missing").await.unwrap_err();
        assert!(matches!(err, NotesError::NotFound(slug) if slug == "Missing"));
    }
}
