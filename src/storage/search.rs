//! 全文搜索索引
//!
//! 纯内存倒排索引，可直接序列化为 JSON 发布
//!
//! - 索引字段：`text`、`title`、`links`、`aka`、`names`
//! - 存储字段：`title`、`excerpt`、`topic`、`aka`
//! - 分词后做英文词干提取，查询词按前缀匹配
//! - 字段权重 title ×3、links ×5、aka ×2

use crate::core::error::{NotesError, Result};
use crate::core::note::NoteRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid regex"));

/// 超过该长度的词不进入索引
const MAX_TERM_LENGTH: usize = 32;

/// 前缀匹配（非完整匹配）的权重折扣
const PREFIX_MATCH_WEIGHT: f64 = 0.5;

/// 英文停用词，保留 "vs" 与 "recent"
static STOP_WORD_SET: Lazy<HashSet<String>> = Lazy::new(|| {
    stop_words::get(stop_words::LANGUAGE::English)
        .iter()
        .map(|word| word.to_string())
        .filter(|word| word != "vs" && word != "recent")
        .collect()
});

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// 可搜索字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchField {
    Text,
    Title,
    Links,
    Aka,
    Names,
}

impl SearchField {
    pub const ALL: [SearchField; 5] = [
        SearchField::Text,
        SearchField::Title,
        SearchField::Links,
        SearchField::Aka,
        SearchField::Names,
    ];

    /// 字段权重
    pub fn boost(self) -> f64 {
        match self {
            SearchField::Title => 3.0,
            SearchField::Links => 5.0,
            SearchField::Aka => 2.0,
            SearchField::Text | SearchField::Names => 1.0,
        }
    }

    fn value(self, note: &NoteRecord) -> &str {
        match self {
            SearchField::Text => &note.text,
            SearchField::Title => &note.title,
            SearchField::Links => &note.links,
            SearchField::Aka => &note.aka,
            SearchField::Names => &note.names,
        }
    }
}

/// 随索引一起保存、随结果返回的字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFields {
    pub title: String,
    pub excerpt: String,
    pub topic: bool,
    pub aka: String,
}

/// 搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    #[serde(flatten)]
    pub stored: StoredFields,
}

type FieldFrequencies = BTreeMap<SearchField, u32>;

/// 倒排索引
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchIndex {
    /// 文档 ID → 存储字段
    documents: BTreeMap<String, StoredFields>,
    /// 词 → 文档 ID → 字段词频
    postings: BTreeMap<String, BTreeMap<String, FieldFrequencies>>,
}

impl SearchIndex {
    /// 创建空索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 文档数量
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// 是否包含指定文档
    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// 添加文档
    ///
    /// 已存在相同 ID 时返回 [`NotesError::DuplicateDocument`]，需先 [`remove`](Self::remove)
    pub fn add(&mut self, note: &NoteRecord) -> Result<()> {
        if self.documents.contains_key(&note.id) {
            return Err(NotesError::DuplicateDocument(note.id.clone()));
        }

        for field in SearchField::ALL {
            for term in tokenize(field.value(note)) {
                *self
                    .postings
                    .entry(term)
                    .or_default()
                    .entry(note.id.clone())
                    .or_default()
                    .entry(field)
                    .or_insert(0) += 1;
            }
        }

        self.documents.insert(
            note.id.clone(),
            StoredFields {
                title: note.title.clone(),
                excerpt: note.excerpt.clone(),
                topic: note.topic,
                aka: note.aka.clone(),
            },
        );
        Ok(())
    }

    /// 移除文档及其全部倒排项
    ///
    /// # Returns
    ///
    /// 文档是否存在
    pub fn remove(&mut self, id: &str) -> bool {
        if self.documents.remove(id).is_none() {
            return false;
        }
        self.postings.retain(|_, docs| {
            docs.remove(id);
            !docs.is_empty()
        });
        true
    }

    /// 搜索
    ///
    /// 查询词之间为 OR 关系，结果按得分降序、ID 升序排列
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let total = self.documents.len() as f64;
        let mut scores: BTreeMap<&str, f64> = BTreeMap::new();

        for query_term in tokenize(query) {
            for (term, docs) in self
                .postings
                .range(query_term.clone()..)
                .take_while(|(term, _)| term.starts_with(query_term.as_str()))
            {
                let weight = if *term == query_term { 1.0 } else { PREFIX_MATCH_WEIGHT };
                let idf = (1.0 + total / docs.len() as f64).ln();
                for (id, fields) in docs {
                    let field_score: f64 = fields
                        .iter()
                        .map(|(field, tf)| field.boost() * f64::from(*tf))
                        .sum();
                    *scores.entry(id.as_str()).or_insert(0.0) += weight * idf * field_score;
                }
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .filter_map(|(id, score)| {
                self.documents.get(id).map(|stored| SearchHit {
                    id: id.to_string(),
                    score,
                    stored: stored.clone(),
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(limit);
        hits
    }
}

/// 分词：`\w+`，小写，过滤超长词与停用词，再做词干提取
///
/// 索引与查询共用，`running` 与 `runs` 得到同一个词
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|term| term.chars().count() <= MAX_TERM_LENGTH)
        .filter(|term| !STOP_WORD_SET.contains(term.as_str()))
        .map(|term| STEMMER.stem(&term).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn note(id: &str, title: &str, text: &str, links: &str) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            public: true,
            topic: false,
            version: String::new(),
            text: text.to_string(),
            links: links.to_string(),
            aka: String::new(),
            names: id.to_string(),
            aliases: Vec::new(),
            excerpt: text.chars().take(256).collect(),
            title: title.to_string(),
            front_matter: Map::new(),
        }
    }

    #[test]
    fn test_tokenize() {
        let terms: Vec<_> = tokenize("The pasta-sauce vs Recent").collect();
        assert_eq!(terms, vec!["pasta", "sauc", "vs", "recent"]);

        let long = "x".repeat(33);
        assert_eq!(tokenize(&long).count(), 0);
    }

    #[test]
    fn test_add_and_search_prefix() {
        let mut index = SearchIndex::new();
        index.add(&note("Rust", "Rust language", "systems programming", "")).unwrap();
        index.add(&note("Cooking", "Cooking", "pasta recipes", "")).unwrap();

        let hits = index.search("prog", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "Rust");
        assert_eq!(hits[0].stored.title, "Rust language");
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut index = SearchIndex::new();
        index.add(&note("A", "A", "text", "")).unwrap();
        let err = index.add(&note("A", "A", "other", "")).unwrap_err();
        assert!(matches!(err, NotesError::DuplicateDocument(id) if id == "A"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_clears_postings() {
        let mut index = SearchIndex::new();
        index.add(&note("A", "Alpha", "unique words", "")).unwrap();
        assert!(index.remove("A"));
        assert!(!index.remove("A"));
        assert!(index.is_empty());
        assert!(index.search("unique", 10).is_empty());
        assert!(index.postings.is_empty());
    }

    #[test]
    fn test_title_boost_ranks_first() {
        let mut index = SearchIndex::new();
        index.add(&note("Body", "Other", "garden garden", "")).unwrap();
        index.add(&note("Titled", "Garden", "nothing here", "")).unwrap();

        let hits = index.search("garden", 10);
        assert_eq!(hits[0].id, "Titled");
        assert_eq!(hits[1].id, "Body");
    }

    #[test]
    fn test_links_field_searchable() {
        let mut index = SearchIndex::new();
        index.add(&note("Hub", "Hub", "", "TargetPage")).unwrap();
        let hits = index.search("targetpage", 10);
        assert_eq!(hits[0].id, "Hub");
    }

    #[test]
    fn test_stemmed_terms_match() {
        assert_eq!(tokenize("cooking").collect::<Vec<_>>(), tokenize("cooked").collect::<Vec<_>>());

        let mut index = SearchIndex::new();
        index.add(&note("Kitchen", "Kitchen", "I was cooking daily", "")).unwrap();
        index.add(&note("Garden", "Garden", "tomatoes", "")).unwrap();

        let hits = index.search("cooks", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "Kitchen");
    }

    #[test]
    fn test_stop_words_only_query() {
        let mut index = SearchIndex::new();
        index.add(&note("A", "the and", "of the", "")).unwrap();
        assert!(index.search("the and of", 10).is_empty());
    }

    #[test]
    fn test_serializes_to_json() {
        let mut index = SearchIndex::new();
        index.add(&note("A", "Alpha", "beta", "")).unwrap();
        let json = serde_json::to_value(&index).unwrap();
        assert!(json["documents"]["A"]["title"] == "Alpha");
        assert!(json["postings"]["beta"]["A"]["text"] == 1);
    }
}
