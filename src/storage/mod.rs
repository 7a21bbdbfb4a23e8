//! 存储层模块
//!
//! 笔记数据库：文档表、源码表、重定向表与全文索引，四者同步更新
//!
//! ## 模块结构
//!
//! - [`search`](search::SearchIndex) - 全文搜索索引
//! - [`repository`](repository::DocumentRepository) - 文档读取抽象

pub mod repository;
pub mod search;

pub use repository::DocumentRepository;
pub use search::{SearchField, SearchHit, SearchIndex, StoredFields};

use crate::core::note::NoteRecord;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 笔记数据库
///
/// 由索引器写入；`document_map` 为权威数据，`search_index` 与之保持一致
#[derive(Debug, Default)]
pub struct NotesDatabase {
    /// slug → 笔记
    pub(crate) document_map: BTreeMap<String, NoteRecord>,
    /// slug → 原始源码
    pub(crate) contents_map: HashMap<String, String>,
    /// 别名 → slug
    pub(crate) redirect_map: BTreeMap<String, String>,
    /// 已知 slug（索引开始即登记，显式移除前一直存在）
    pub(crate) known: BTreeSet<String>,
    /// 全文索引
    pub(crate) search_index: SearchIndex,
}

impl NotesDatabase {
    /// 创建空数据库
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取笔记
    pub fn get(&self, slug: &str) -> Option<&NoteRecord> {
        self.document_map.get(slug)
    }

    /// 是否已有笔记记录
    pub fn contains(&self, slug: &str) -> bool {
        self.document_map.contains_key(slug)
    }

    /// slug 是否已知（包括正在刷新或解析失败的笔记）
    pub fn is_known(&self, slug: &str) -> bool {
        self.known.contains(slug)
    }

    /// 已知 slug 集合
    pub fn known_slugs(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    /// 笔记数量
    pub fn len(&self) -> usize {
        self.document_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_map.is_empty()
    }

    /// 全部笔记（按 slug 排序）
    pub fn documents(&self) -> impl Iterator<Item = &NoteRecord> {
        self.document_map.values()
    }

    /// 原始源码
    pub fn source(&self, slug: &str) -> Option<&str> {
        self.contents_map.get(slug).map(String::as_str)
    }

    /// 别名重定向表
    pub fn redirects(&self) -> &BTreeMap<String, String> {
        &self.redirect_map
    }

    /// 解析名称：本身是笔记则返回自身，否则查重定向表
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.document_map.contains_key(name) {
            return Some(name);
        }
        self.redirect_map.get(name).map(String::as_str)
    }

    /// 全文索引
    pub fn search_index(&self) -> &SearchIndex {
        &self.search_index
    }

    /// 全文搜索
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.search_index.search(query, limit)
    }

    /// 公开笔记的版本表（slug → 源码哈希）
    pub fn public_versions(&self) -> BTreeMap<String, String> {
        self.document_map
            .values()
            .filter(|note| note.public)
            .map(|note| (note.id.clone(), note.version.clone()))
            .collect()
    }
}
