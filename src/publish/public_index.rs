//! 公开索引
//!
//! 与公开树使用同一遍历，同时生成：
//!
//! - 只包含公开可达笔记的搜索索引（正文清空，保留摘要）
//! - 按发现顺序排列的 slug 列表（用于 sitemap）
//! - 层级目录树

use super::traversal::{traverse, TraversalConfig, Visit};
use crate::core::error::Result;
use crate::core::note::NoteRecord;
use crate::storage::{DocumentRepository, SearchIndex};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static HEADING_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+").expect("valid regex"));
static MARKUP_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*\[\]]").expect("valid regex"));

/// 目录树节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// 渲染为 Markdown 目录，每层缩进两个空格
    pub fn toc(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            out.push_str(&format!("{}- [{}]({})\n", "  ".repeat(depth), node.title, node.id));
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// 节点总数（包括自身）
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(DocumentNode::count).sum::<usize>()
    }
}

/// 公开索引
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicIndex {
    /// 搜索索引
    pub index: SearchIndex,
    /// 目录树，根笔记不可达时为 None
    pub tree: Option<DocumentNode>,
    /// 按发现顺序排列的 slug
    pub ids: Vec<String>,
}

impl PublicIndex {
    /// 生成 sitemap.txt 内容：每行一个 URL
    ///
    /// # Arguments
    ///
    /// * `base_url` - 站点地址，例如 `https://notes.example.com`
    pub fn sitemap(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        self.ids
            .iter()
            .map(|id| format!("{base}/{id}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 去掉标题中的 Markdown 标记
pub fn clean_title(title: &str) -> String {
    let title = HEADING_PREFIX.replace(title, "");
    MARKUP_CHARS.replace_all(&title, "").into_owned()
}

/// 公开版本的笔记：正文清空，摘要保留
fn public_variant(note: &NoteRecord) -> NoteRecord {
    NoteRecord {
        text: String::new(),
        ..note.clone()
    }
}

/// 生成公开索引
///
/// # Arguments
///
/// * `repo` - 文档仓库（在线数据库或某个提交）
/// * `config` - 遍历参数
///
/// # Returns
///
/// 公开索引；搜索索引写入失败时返回错误
pub fn generate_public_index<R>(repo: &R, config: &TraversalConfig) -> Result<PublicIndex>
where
    R: DocumentRepository + ?Sized,
{
    let visits = traverse(repo, config);

    let mut index = SearchIndex::new();
    for visit in &visits {
        index.add(&public_variant(&visit.note))?;
    }

    let ids = visits.iter().map(|v| v.note.id.clone()).collect();
    let tree = build_tree(&visits);

    tracing::info!("Generated public index with {} notes", visits.len());
    Ok(PublicIndex { index, tree, ids })
}

/// 由访问序列构造层级树
///
/// 子节点总是在父节点之后被发现，逆序处理即可自底向上组装
fn build_tree(visits: &[Visit]) -> Option<DocumentNode> {
    let mut pending: HashMap<&str, Vec<DocumentNode>> = HashMap::new();
    let mut root = None;

    for visit in visits.iter().rev() {
        let mut children = pending.remove(visit.note.id.as_str()).unwrap_or_default();
        children.reverse();
        let node = DocumentNode {
            id: visit.note.id.clone(),
            title: clean_title(&visit.note.title),
            children,
        };
        match visit.parent.as_deref() {
            Some(parent) => pending.entry(parent).or_default().push(node),
            None => root = Some(node),
        }
    }

    root
}
