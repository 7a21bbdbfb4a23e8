//! 索引模块
//!
//! 将笔记源码解析并写入笔记数据库
//!
//! ## 功能
//!
//! - 单篇笔记索引 / 移除
//! - 源码未变化时跳过
//! - 公开模式（只索引 `public: true` 的笔记）
//! - 汇总统计

use crate::core::error::Result;
use crate::core::note::{truncate_chars, NoteRecord, EXCERPT_LENGTH, TOPIC_SUFFIX};
use crate::core::object::hash_content;
use crate::core::parser::{parse_frontmatter, MarkdownContent};
use crate::storage::NotesDatabase;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// 第一句：到 ". "、换行或结尾为止
static FIRST_SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)(?:\.\s|\n|$)").expect("valid regex"));

/// 笔记引用标记，例如 `(20200101T000000Z0000)`
static NOTE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d+T\d+Z\d+)\)").expect("valid regex"));

/// 索引选项
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// 只索引公开笔记
    pub public_only: bool,
}

impl IndexOptions {
    pub fn public_only() -> Self {
        Self { public_only: true }
    }
}

/// 索引结果
#[derive(Debug, Clone, PartialEq)]
pub enum IndexResult {
    /// 笔记被写入数据库
    Indexed {
        /// 笔记 ID
        slug: String,
        /// 索引前 slug 是否已知
        existed: bool,
        /// 内部链接数
        link_count: usize,
    },
    /// 源码与已索引内容完全相同
    Unchanged,
    /// 公开模式下的非公开笔记
    Skipped,
    /// 笔记被移除
    Deleted(String),
}

impl IndexResult {
    /// 被索引时返回 slug
    pub fn indexed_slug(&self) -> Option<&str> {
        match self {
            IndexResult::Indexed { slug, .. } => Some(slug),
            _ => None,
        }
    }
}

/// 索引单篇笔记
///
/// # Arguments
///
/// * `db` - 笔记数据库
/// * `slug` - 笔记 ID
/// * `source` - 原始源码（frontmatter + 正文）
/// * `options` - 索引选项
///
/// # Returns
///
/// 索引结果；frontmatter 解析失败时返回 [`NotesError::Parse`](crate::core::NotesError::Parse)，
/// 此时 slug 仍保持已知状态，数据库其余部分不变
pub fn index_note(
    db: &mut NotesDatabase,
    slug: &str,
    source: &str,
    options: &IndexOptions,
) -> Result<IndexResult> {
    let existed = !db.known.insert(slug.to_string());

    if db.document_map.contains_key(slug)
        && db.contents_map.get(slug).map(String::as_str) == Some(source)
    {
        return Ok(IndexResult::Unchanged);
    }

    let (frontmatter, body) = parse_frontmatter(slug, source)?;
    if options.public_only && !frontmatter.public {
        if !existed {
            db.known.remove(slug);
        }
        return Ok(IndexResult::Skipped);
    }

    let markdown = MarkdownContent::parse(&body);
    let links = markdown.internal_links();
    let mut text = NOTE_REFERENCE.replace_all(&markdown.text, "").trim().to_string();

    let mut title = frontmatter.title.clone().unwrap_or_default();
    if title.is_empty() {
        let (first_sentence, consumed) = match FIRST_SENTENCE.captures(&text) {
            Some(caps) => (
                caps.get(1).map_or("", |m| m.as_str()).to_string(),
                caps.get(0).map_or(0, |m| m.end()),
            ),
            None => (String::new(), 0),
        };
        title = first_sentence;
        text = text[consumed..].trim().to_string();
    }
    if frontmatter.topic {
        title.push_str(TOPIC_SUFFIX);
    }

    let mut aliases: Vec<String> = Vec::new();
    for alias in &frontmatter.aliases {
        if alias != slug && !aliases.contains(alias) {
            aliases.push(alias.clone());
        }
    }
    let names = std::iter::once(slug.to_string())
        .chain(aliases.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");

    let note = NoteRecord {
        id: slug.to_string(),
        public: frontmatter.public,
        topic: frontmatter.topic,
        version: hash_content(source.as_bytes()),
        excerpt: truncate_chars(&text, EXCERPT_LENGTH),
        text,
        links: links.join(" "),
        aka: frontmatter.aka.join(" "),
        names,
        aliases,
        title,
        front_matter: frontmatter.raw,
    };

    if let Some(previous) = db.document_map.get(slug) {
        let stale = previous.aliases.clone();
        remove_redirects(db, slug, &stale);
        db.search_index.remove(slug);
    }
    for alias in &note.aliases {
        db.redirect_map.insert(alias.clone(), slug.to_string());
    }
    db.search_index.add(&note)?;
    db.contents_map.insert(slug.to_string(), source.to_string());
    db.document_map.insert(slug.to_string(), note);

    tracing::debug!("Indexed {} ({} links)", slug, links.len());
    Ok(IndexResult::Indexed {
        slug: slug.to_string(),
        existed,
        link_count: links.len(),
    })
}

/// 移除笔记的全部痕迹
///
/// # Returns
///
/// 是否移除了已索引的笔记。只处于已知状态（例如解析失败）的 slug
/// 会被遗忘，但返回 `false`
pub fn unindex_note(db: &mut NotesDatabase, slug: &str) -> bool {
    db.known.remove(slug);
    let Some(previous) = db.document_map.remove(slug) else {
        return false;
    };

    remove_redirects(db, slug, &previous.aliases);
    db.search_index.remove(slug);
    db.contents_map.remove(slug);

    tracing::debug!("Unindexed {}", slug);
    true
}

/// 删除仍指向 slug 的别名
fn remove_redirects(db: &mut NotesDatabase, slug: &str, aliases: &[String]) {
    for alias in aliases {
        if db.redirect_map.get(alias).map(String::as_str) == Some(slug) {
            db.redirect_map.remove(alias);
        }
    }
}

/// 索引汇总
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexSummary {
    /// 新增笔记数
    pub added: usize,
    /// 内容变化的笔记数
    pub changed: usize,
    /// 内容未变的笔记数
    pub unchanged: usize,
    /// 跳过的笔记数
    pub skipped: usize,
    /// 移除的笔记数
    pub removed: usize,
    /// 错误列表 (slug, message)
    pub errors: Vec<(String, String)>,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 结束时间
    pub finished_at: Option<DateTime<Utc>>,
}

impl IndexSummary {
    /// 以当前时间开始一次汇总
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            ..Self::default()
        }
    }

    /// 添加索引结果
    pub fn add(&mut self, result: IndexResult) {
        match result {
            IndexResult::Indexed { existed: true, .. } => self.changed += 1,
            IndexResult::Indexed { existed: false, .. } => self.added += 1,
            IndexResult::Unchanged => self.unchanged += 1,
            IndexResult::Skipped => self.skipped += 1,
            IndexResult::Deleted(_) => self.removed += 1,
        }
    }

    /// 记录单篇错误
    pub fn add_error(&mut self, slug: &str, error: impl ToString) {
        self.errors.push((slug.to_string(), error.to_string()));
    }

    /// 标记结束
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// 检查是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
