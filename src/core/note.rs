//! 笔记数据模型

use crate::core::parser::strip_fragment;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 主题笔记标题后缀
pub const TOPIC_SUFFIX: &str = " (topic)";

/// 摘要长度（字符数）
pub const EXCERPT_LENGTH: usize = 256;

/// 一篇已索引的笔记
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// 笔记 ID（slug），数据库内唯一
    pub id: String,

    /// 是否公开
    pub public: bool,

    /// 是否是主题（hub）笔记
    pub topic: bool,

    /// 源码哈希
    pub version: String,

    /// 纯文本正文（已去掉标题句）
    pub text: String,

    /// 空格分隔的内部链接目标，保持原顺序，允许重复
    pub links: String,

    /// 额外搜索词，空格分隔
    pub aka: String,

    /// slug 与别名，空格分隔
    pub names: String,

    /// frontmatter 中的别名，按原样保存（可以包含空格）
    #[serde(default)]
    pub aliases: Vec<String>,

    /// 正文前 256 个字符
    pub excerpt: String,

    /// 标题
    pub title: String,

    /// 原始 frontmatter
    #[serde(default)]
    pub front_matter: Map<String, Value>,
}

impl NoteRecord {
    /// 链接目标（去掉 `#fragment`，跳过空项）
    pub fn link_targets(&self) -> impl Iterator<Item = &str> {
        self.links
            .split(' ')
            .map(strip_fragment)
            .filter(|link| !link.is_empty())
    }
}

/// 取字符串前 n 个字符
pub fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
